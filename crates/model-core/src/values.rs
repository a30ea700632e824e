//! Value representations for generated and validated records.
//!
//! [`FieldValue`] is the JSON-shaped value every generator produces and every
//! validator consumes; [`Record`] is one record instance.

use crate::types::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw field value.
///
/// Serializes untagged, so a value maps 1:1 onto its JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Whether the value is a whole number (an `Int`, or a `Float` without a
    /// fractional part).
    pub fn is_integral(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{other:?}"),
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One record instance.
///
/// Created by the generator (or parsed from JSON for validation) and not
/// mutated after post-processing. Serializes as a flat JSON object of its
/// fields; sub-records are nested one level as objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Record type name, e.g. `basal`
    pub record_type: String,

    /// Variant the record was generated from, e.g. `temp`
    pub variant: String,

    /// Context the record was generated for, when known
    pub context: Option<Context>,

    /// Field values (field name -> value)
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(
        record_type: impl Into<String>,
        variant: impl Into<String>,
        context: Option<Context>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            variant: variant.into(),
            context,
            fields,
        }
    }

    pub fn builder(record_type: impl Into<String>, variant: impl Into<String>) -> RecordBuilder {
        RecordBuilder {
            record_type: record_type.into(),
            variant: variant.into(),
            context: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a dotted path such as `suppressed.rate`.
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.fields.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Convert into the value stored under a containing record's field.
    pub fn into_object(self) -> FieldValue {
        FieldValue::Object(self.fields)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.fields.serialize(serializer)
    }
}

/// Builder for [`Record`].
pub struct RecordBuilder {
    record_type: String,
    variant: String,
    context: Option<Context>,
    fields: BTreeMap<String, FieldValue>,
}

impl RecordBuilder {
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Record {
        Record {
            record_type: self.record_type,
            variant: self.variant,
            context: self.context,
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Int(42).as_i64(), Some(42));
        assert_eq!(FieldValue::Int(42).as_f64(), Some(42.0));
        assert_eq!(FieldValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(FieldValue::Float(3.5).as_i64(), None);
        assert_eq!(FieldValue::from("temp").as_str(), Some("temp"));
        assert_eq!(FieldValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_field_value_json_shape() {
        let value: FieldValue = serde_json::from_str(r#"{"rate": 1, "percent": 0.5}"#).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("rate"), Some(&FieldValue::Int(1)));
        assert_eq!(obj.get("percent"), Some(&FieldValue::Float(0.5)));

        let json = serde_json::to_string(&FieldValue::Array(vec![
            FieldValue::Null,
            FieldValue::from("a"),
        ]))
        .unwrap();
        assert_eq!(json, r#"[null,"a"]"#);
    }

    #[test]
    fn test_record_builder_and_path_lookup() {
        let mut suppressed = BTreeMap::new();
        suppressed.insert("rate".to_string(), FieldValue::Float(2.0));

        let record = Record::builder("basal", "temp")
            .context(Context::Ingestion)
            .field("deliveryType", "temp")
            .field("suppressed", FieldValue::Object(suppressed))
            .build();

        assert_eq!(record.field_count(), 2);
        assert_eq!(record.get_path("suppressed.rate"), Some(&FieldValue::Float(2.0)));
        assert_eq!(record.get_path("suppressed.missing"), None);
        assert_eq!(record.get_path("deliveryType.rate"), None);
        assert!(record.contains("deliveryType"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = Record::builder("cbg", "cbg")
            .field("type", "cbg")
            .field("value", 5.5)
            .build();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"type":"cbg","value":5.5}"#);
    }
}
