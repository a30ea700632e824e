//! Field descriptors and schema fragments.
//!
//! ## Type Hierarchy
//!
//! - [`ExampleValue`] - How an example value for a field is produced
//! - [`FieldContract`] - Context-sensitive constraints of a field
//! - [`FieldDescriptor`] - Example value + contract + change history
//! - [`SchemaFragment`] - Named, reusable mapping of field name to descriptor
//!
//! Fragments are immutable once built. They are combined by the composition
//! engine in [`crate::compose`].

use crate::types::{
    ChangeAnnotation, ContextRequirements, NumericContract, Requirement, ValueKind,
};
use crate::values::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Discriminant value not among a record type's known variants
    #[error("Unknown variant '{variant}' for record type '{record_type}' (known: {})", .known.join(", "))]
    UnknownVariant {
        record_type: String,
        variant: String,
        known: Vec<String>,
    },

    /// Record type not in the catalog
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    /// Shared fragment not in the fragment library
    #[error("Fragment not found in library: {0}")]
    FragmentNotFound(String),

    /// Nested whitelist names a field the nested variant does not have
    #[error("Nested field '{field}' not found in variant '{variant}' of '{record_type}'")]
    UnknownNestedField {
        record_type: String,
        variant: String,
        field: String,
    },

    /// Unparseable schema version
    #[error("Invalid schema version: {0}")]
    InvalidVersion(String),

    /// Error reading a schema or override file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

// ============================================================================
// Example Values
// ============================================================================

/// Timestamp-derived values, resolved from the generation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    /// UTC timestamp, RFC 3339 with milliseconds
    Utc,
    /// Device-local wall clock time without zone
    DeviceLocal,
    /// Timezone offset in minutes
    TimezoneOffset,
    /// Offset between device and true time in milliseconds
    ConversionOffset,
    /// Time the record was stored, slightly after `Utc`
    CreatedTime,
}

/// How an example value for a field is produced.
///
/// Evaluated on every generation, never cached: two generations of the same
/// schema yield independently drawn values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExampleValue {
    /// Fixed value
    Literal { value: FieldValue },

    /// Random integer in a range (inclusive)
    IntRange { min: i64, max: i64 },

    /// Random float in a range (inclusive), rounded to `decimals` places
    FloatRange {
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decimals: Option<u32>,
    },

    /// Random selection from a pool of values
    OneOf { values: Vec<FieldValue> },

    /// Weighted boolean
    WeightedBool { true_weight: f64 },

    /// Random UUID v4 string
    Uuid,

    /// Random lowercase hex string
    HexId { length: usize },

    /// Pattern with `{rand:N}` placeholders
    Pattern { pattern: String },

    /// Derived from the generation timestamp
    Time { field: TimeField },

    /// Produced only by variant post-processing
    Derived,
}

impl ExampleValue {
    pub fn literal(value: impl Into<FieldValue>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn float_range(min: f64, max: f64, decimals: u32) -> Self {
        Self::FloatRange {
            min,
            max,
            decimals: Some(decimals),
        }
    }

    pub fn time(field: TimeField) -> Self {
        Self::Time { field }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Derived)
    }
}

// ============================================================================
// Contracts
// ============================================================================

/// Contracts of the fields of an embedded sub-record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedContract {
    pub fields: BTreeMap<String, FieldContract>,
}

/// Context-sensitive constraints of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldContract {
    /// Required-ness per deployment context
    #[serde(default)]
    pub requirements: ContextRequirements,

    /// Expected JSON shape
    pub kind: ValueKind,

    /// Numeric type, unit and range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericContract>,

    /// Finite set of allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<FieldValue>>,

    /// Contract of an embedded sub-record (filled in by composition)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedContract>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldContract {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            requirements: ContextRequirements::always(),
            kind,
            numeric: None,
            allowed: None,
            nested: None,
            description: None,
        }
    }

    pub fn requirement(&self, context: crate::types::Context) -> Requirement {
        self.requirements.get(context)
    }
}

// ============================================================================
// Field Descriptor
// ============================================================================

/// The atomic unit of a schema: an example-value generator plus a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub example: ExampleValue,

    #[serde(flatten)]
    pub contract: FieldContract,

    /// Historical change annotations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ChangeAnnotation>,
}

impl FieldDescriptor {
    /// Create a descriptor required in every context.
    pub fn new(kind: ValueKind, example: ExampleValue) -> Self {
        Self {
            example,
            contract: FieldContract::new(kind),
            changes: Vec::new(),
        }
    }

    /// A field that exists in no context. Used by variants to switch off a
    /// field the base fragment declares.
    pub fn not_applicable(kind: ValueKind) -> Self {
        Self::new(kind, ExampleValue::Derived).requirements(ContextRequirements::never())
    }

    pub fn requirements(mut self, requirements: ContextRequirements) -> Self {
        self.contract.requirements = requirements;
        self
    }

    pub fn optional(self) -> Self {
        self.requirements(ContextRequirements::optional())
    }

    pub fn numeric(mut self, numeric: NumericContract) -> Self {
        self.contract.numeric = Some(numeric);
        self
    }

    pub fn allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.contract.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.contract.description = Some(description.into());
        self
    }

    pub fn change(mut self, change: ChangeAnnotation) -> Self {
        self.changes.push(change);
        self
    }
}

// ============================================================================
// Schema Fragment
// ============================================================================

/// Named mapping of field name to descriptor.
///
/// Order-independent; fragments combine by field name with the later
/// fragment winning on collision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFragment {
    pub name: String,

    #[serde(default)]
    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl SchemaFragment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add (or replace) a field.
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), descriptor);
        self
    }

    /// Add every field of `other`, replacing fields with the same name.
    pub fn extend(mut self, other: &SchemaFragment) -> Self {
        for (name, descriptor) in &other.fields {
            self.fields.insert(name.clone(), descriptor.clone());
        }
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Load a fragment from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a fragment from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
