//! Record types, variants and the fragment library.
//!
//! A [`RecordType`] owns its base fragments and a fixed set of variants keyed
//! by discriminant value. Resolving a discriminant against a
//! [`FragmentLibrary`] yields the [`EffectiveSchema`] of that variant.
//!
//! Fragment order for a variant is always:
//!
//! ```text
//! [library envelope, library shared..., base..., discriminant, variant, overrides...]
//! ```

use crate::compose::{compose, EffectiveSchema, NestedSchema};
use crate::schema::{
    ExampleValue, FieldDescriptor, NestedContract, SchemaError, SchemaFragment,
};
use crate::types::ValueKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Bucketing applied to the generation timestamp before any value is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeTransform {
    StartOfHour,
    StartOfDay,
}

impl TimeTransform {
    pub fn apply(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let bucket = match self {
            Self::StartOfHour => 3_600,
            Self::StartOfDay => 86_400,
        };
        let secs = timestamp.timestamp();
        DateTime::from_timestamp(secs - secs.rem_euclid(bucket), 0).unwrap_or(timestamp)
    }
}

/// Embedded sub-record of the same record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedSpec {
    /// Field of the containing record holding the sub-record
    pub field: String,
    /// Variant the sub-record is composed from
    pub variant: String,
    /// Fields kept on the sub-record
    pub whitelist: Vec<String>,
}

/// `target = factor * source`, applied only when `factor` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDerivation {
    pub target: String,
    pub factor: String,
    /// Dotted path, e.g. `suppressed.rate`
    pub source: String,
}

/// `target = multiplier * source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleDerivation {
    pub target: String,
    pub source: String,
    pub multiplier: f64,
}

/// Variant-specific steps run after the schema walk, in field order:
/// removals, nested sub-record, products, multiples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostProcessing {
    #[serde(default)]
    pub remove: Vec<String>,
    #[serde(default)]
    pub nested: Option<NestedSpec>,
    #[serde(default)]
    pub products: Vec<ProductDerivation>,
    #[serde(default)]
    pub multiples: Vec<MultipleDerivation>,
}

impl PostProcessing {
    pub fn remove(mut self, field: impl Into<String>) -> Self {
        self.remove.push(field.into());
        self
    }

    pub fn nested<I, S>(
        mut self,
        field: impl Into<String>,
        variant: impl Into<String>,
        whitelist: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nested = Some(NestedSpec {
            field: field.into(),
            variant: variant.into(),
            whitelist: whitelist.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn product(
        mut self,
        target: impl Into<String>,
        factor: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.products.push(ProductDerivation {
            target: target.into(),
            factor: factor.into(),
            source: source.into(),
        });
        self
    }

    pub fn multiple(
        mut self,
        target: impl Into<String>,
        source: impl Into<String>,
        multiplier: f64,
    ) -> Self {
        self.multiples.push(MultipleDerivation {
            target: target.into(),
            source: source.into(),
            multiplier,
        });
        self
    }

    /// Copy for a sub-record: no further nesting, and derivations limited
    /// to targets the sub-record keeps.
    fn for_nested(&self, whitelist: &[String]) -> Self {
        let kept = |name: &String| whitelist.contains(name);
        Self {
            remove: self.remove.clone(),
            nested: None,
            products: self
                .products
                .iter()
                .filter(|p| kept(&p.target))
                .cloned()
                .collect(),
            multiples: self
                .multiples
                .iter()
                .filter(|m| kept(&m.target))
                .cloned()
                .collect(),
        }
    }
}

/// One variant of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDefinition {
    pub fragment: SchemaFragment,
    pub post: PostProcessing,
}

impl VariantDefinition {
    pub fn new(fragment: SchemaFragment) -> Self {
        Self {
            fragment,
            post: PostProcessing::default(),
        }
    }

    pub fn with_post(mut self, post: PostProcessing) -> Self {
        self.post = post;
        self
    }
}

/// A record type: base fragments plus variants selected by a discriminant.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub name: String,

    /// Discriminant field; `None` for single-variant record types, whose only
    /// variant is keyed by the record type name.
    pub discriminant: Option<String>,

    /// Names of library fragments composed before the base fragments
    pub shared: Vec<String>,

    pub base: Vec<SchemaFragment>,

    pub variants: BTreeMap<String, VariantDefinition>,

    pub time_transform: Option<TimeTransform>,
}

impl RecordType {
    /// Record type with variants selected by `discriminant`.
    pub fn new(name: impl Into<String>, discriminant: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminant: Some(discriminant.into()),
            shared: Vec::new(),
            base: Vec::new(),
            variants: BTreeMap::new(),
            time_transform: None,
        }
    }

    /// Record type with a single variant named after the type.
    pub fn single(name: impl Into<String>, fragment: SchemaFragment) -> Self {
        let name = name.into();
        let mut variants = BTreeMap::new();
        variants.insert(name.clone(), VariantDefinition::new(fragment));
        Self {
            name,
            discriminant: None,
            shared: Vec::new(),
            base: Vec::new(),
            variants,
            time_transform: None,
        }
    }

    pub fn shared(mut self, fragment_name: impl Into<String>) -> Self {
        self.shared.push(fragment_name.into());
        self
    }

    pub fn base(mut self, fragment: SchemaFragment) -> Self {
        self.base.push(fragment);
        self
    }

    pub fn variant(mut self, name: impl Into<String>, definition: VariantDefinition) -> Self {
        self.variants.insert(name.into(), definition);
        self
    }

    pub fn with_time_transform(mut self, transform: TimeTransform) -> Self {
        self.time_transform = Some(transform);
        self
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.keys().map(String::as_str).collect()
    }

    /// Look up a variant by discriminant value.
    pub fn get_variant(&self, variant: &str) -> Result<&VariantDefinition, SchemaError> {
        self.variants
            .get(variant)
            .ok_or_else(|| SchemaError::UnknownVariant {
                record_type: self.name.clone(),
                variant: variant.to_string(),
                known: self.variants.keys().cloned().collect(),
            })
    }

    /// Resolve `variant` into its effective schema.
    pub fn effective_schema(
        &self,
        library: &FragmentLibrary,
        variant: &str,
    ) -> Result<EffectiveSchema, SchemaError> {
        self.effective_schema_with_overrides(library, variant, &[])
    }

    /// Resolve `variant`, composing `overrides` after the variant fragment.
    ///
    /// `overrides` apply to `variant` only; a sub-record composed from
    /// another variant keeps the catalog contract.
    pub fn effective_schema_with_overrides(
        &self,
        library: &FragmentLibrary,
        variant: &str,
        overrides: &[SchemaFragment],
    ) -> Result<EffectiveSchema, SchemaError> {
        self.effective_schema_with(library, variant, |v| {
            if v == variant {
                overrides.to_vec()
            } else {
                Vec::new()
            }
        })
    }

    /// Resolve `variant`, asking `overrides_for` for the override fragments
    /// of every variant composed: the requested one and, when it nests a
    /// sub-record, the sub-record's variant.
    pub fn effective_schema_with<F>(
        &self,
        library: &FragmentLibrary,
        variant: &str,
        overrides_for: F,
    ) -> Result<EffectiveSchema, SchemaError>
    where
        F: Fn(&str) -> Vec<SchemaFragment>,
    {
        let definition = self.get_variant(variant)?;
        let overrides = overrides_for(variant);
        let mut fields = self.compose_variant(library, variant, definition, &overrides)?;

        let mut nested = BTreeMap::new();
        if let Some(spec) = &definition.post.nested {
            let inner = self.resolve_nested(library, spec, &overrides_for(&spec.variant))?;
            if let Some(descriptor) = fields.get_mut(&spec.field) {
                descriptor.contract.nested = Some(NestedContract {
                    fields: inner
                        .fields
                        .iter()
                        .map(|(name, d)| (name.clone(), d.contract.clone()))
                        .collect(),
                });
            }
            nested.insert(
                spec.field.clone(),
                NestedSchema {
                    whitelist: spec.whitelist.clone(),
                    schema: inner,
                },
            );
        }

        Ok(EffectiveSchema {
            record_type: self.name.clone(),
            variant: variant.to_string(),
            discriminant: self.discriminant.clone(),
            fields,
            post: definition.post.clone(),
            nested,
            time_transform: self.time_transform,
        })
    }

    fn compose_variant(
        &self,
        library: &FragmentLibrary,
        variant: &str,
        definition: &VariantDefinition,
        overrides: &[SchemaFragment],
    ) -> Result<BTreeMap<String, FieldDescriptor>, SchemaError> {
        let discriminant = self.discriminant_fragment(variant);

        let mut fragments: Vec<&SchemaFragment> = vec![&library.envelope];
        for name in &self.shared {
            fragments.push(library.get_shared(name)?);
        }
        fragments.extend(self.base.iter());
        if let Some(fragment) = &discriminant {
            fragments.push(fragment);
        }
        fragments.push(&definition.fragment);
        fragments.extend(overrides.iter());

        Ok(compose(&fragments))
    }

    /// Synthetic fragment pinning the discriminant field to `variant`.
    fn discriminant_fragment(&self, variant: &str) -> Option<SchemaFragment> {
        let field = self.discriminant.as_ref()?;
        Some(SchemaFragment::new(format!("{}-discriminant", self.name)).field(
            field.clone(),
            FieldDescriptor::new(ValueKind::String, ExampleValue::literal(variant))
                .allowed(self.variants.keys().map(String::as_str))
                .describe(format!("Discriminant selecting the {} variant", self.name)),
        ))
    }

    /// Compose a sub-record one level deep, restricted to its whitelist.
    fn resolve_nested(
        &self,
        library: &FragmentLibrary,
        spec: &NestedSpec,
        overrides: &[SchemaFragment],
    ) -> Result<EffectiveSchema, SchemaError> {
        let definition = self.get_variant(&spec.variant)?;
        let all = self.compose_variant(library, &spec.variant, definition, overrides)?;

        let mut fields = BTreeMap::new();
        for name in &spec.whitelist {
            let descriptor = all
                .get(name)
                .ok_or_else(|| SchemaError::UnknownNestedField {
                    record_type: self.name.clone(),
                    variant: spec.variant.clone(),
                    field: name.clone(),
                })?;
            fields.insert(name.clone(), descriptor.clone());
        }
        debug!(
            "Resolved nested '{}' of {} as variant '{}' with {} fields",
            spec.field,
            self.name,
            spec.variant,
            fields.len()
        );

        Ok(EffectiveSchema {
            record_type: self.name.clone(),
            variant: spec.variant.clone(),
            discriminant: self.discriminant.clone(),
            fields,
            post: definition.post.for_nested(&spec.whitelist),
            nested: BTreeMap::new(),
            time_transform: self.time_transform,
        })
    }
}

/// Immutable set of shared fragments every record type composes against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentLibrary {
    /// Universal envelope fields (time, identifiers, schema metadata)
    pub envelope: SchemaFragment,

    pub shared: BTreeMap<String, SchemaFragment>,
}

impl FragmentLibrary {
    pub fn new(envelope: SchemaFragment) -> Self {
        Self {
            envelope,
            shared: BTreeMap::new(),
        }
    }

    pub fn with_shared(mut self, fragment: SchemaFragment) -> Self {
        self.shared.insert(fragment.name.clone(), fragment);
        self
    }

    pub fn get_shared(&self, name: &str) -> Result<&SchemaFragment, SchemaError> {
        self.shared
            .get(name)
            .ok_or_else(|| SchemaError::FragmentNotFound(name.to_string()))
    }
}

/// A fragment library plus the record types composed against it.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub library: FragmentLibrary,
    record_types: BTreeMap<String, RecordType>,
}

impl Catalog {
    pub fn new(library: FragmentLibrary) -> Self {
        Self {
            library,
            record_types: BTreeMap::new(),
        }
    }

    pub fn with(mut self, record_type: RecordType) -> Self {
        self.record_types
            .insert(record_type.name.clone(), record_type);
        self
    }

    pub fn record_type(&self, name: &str) -> Result<&RecordType, SchemaError> {
        self.record_types
            .get(name)
            .ok_or_else(|| SchemaError::UnknownRecordType(name.to_string()))
    }

    pub fn record_types(&self) -> impl Iterator<Item = &RecordType> {
        self.record_types.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.record_types.keys().map(String::as_str).collect()
    }

    /// Resolve a record type and variant in one step.
    pub fn effective_schema(
        &self,
        record_type: &str,
        variant: &str,
    ) -> Result<EffectiveSchema, SchemaError> {
        self.record_type(record_type)?
            .effective_schema(&self.library, variant)
    }
}
