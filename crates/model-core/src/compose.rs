//! Composition engine.
//!
//! Merges an ordered list of [`SchemaFragment`]s into the field map of one
//! concrete record variant. The merge is shallow and right-biased: a field
//! declared by a later fragment replaces the earlier descriptor as a whole.
//! Inputs are never mutated; every call returns a freshly built map.

use crate::record_type::{PostProcessing, TimeTransform};
use crate::schema::{FieldDescriptor, SchemaFragment};
use crate::types::Context;
use std::collections::BTreeMap;
use tracing::debug;

/// Merge `fragments` in order, later fragments winning on name collision.
pub fn compose(fragments: &[&SchemaFragment]) -> BTreeMap<String, FieldDescriptor> {
    let mut fields = BTreeMap::new();
    for fragment in fragments {
        for (name, descriptor) in &fragment.fields {
            fields.insert(name.clone(), descriptor.clone());
        }
    }
    debug!(
        "Composed {} fields from fragments [{}]",
        fields.len(),
        fragments
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    fields
}

/// Embedded sub-record resolved for one field of an effective schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedSchema {
    /// Fields kept on the sub-record
    pub whitelist: Vec<String>,

    /// Schema of the sub-record, restricted to `whitelist`
    pub schema: EffectiveSchema,
}

/// Fully merged schema of one concrete record variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSchema {
    pub record_type: String,
    pub variant: String,

    /// Name of the discriminant field, e.g. `deliveryType`
    pub discriminant: Option<String>,

    pub fields: BTreeMap<String, FieldDescriptor>,

    /// Variant-specific post-processing
    pub post: PostProcessing,

    /// Resolved sub-records (containing field -> nested schema)
    pub nested: BTreeMap<String, NestedSchema>,

    /// Timestamp transform applied before generation
    pub time_transform: Option<TimeTransform>,
}

impl EffectiveSchema {
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Whether post-processing drops `name` from generated records.
    pub fn is_removed(&self, name: &str) -> bool {
        self.post.remove.iter().any(|r| r == name)
    }

    /// Fields a record generated for `context` can carry: applicable in
    /// the context and not removed by post-processing.
    pub fn emitted_in(&self, context: Context) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(name, d)| {
                d.contract.requirement(context).is_applicable() && !self.is_removed(name)
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Fields that must be present on a record for `context`.
    pub fn required_in(&self, context: Context) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(name, d)| {
                d.contract.requirements.required_in(context) == Some(true)
                    && !self.is_removed(name)
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn nested_schema(&self, field: &str) -> Option<&NestedSchema> {
        self.nested.get(field)
    }
}
