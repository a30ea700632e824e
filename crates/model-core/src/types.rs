//! Contract primitives for the device data model.
//!
//! This module defines the building blocks every field contract is made of:
//! deployment [`Context`]s, per-context [`Requirement`]s, numeric contracts
//! with literal or symbolic [`Bound`]s, and schema-version change annotations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::schema::SchemaError;
use crate::values::{FieldValue, Record};

/// Deployment context a record can appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    /// Raw device data as uploaded.
    Ingestion,
    /// Persisted platform storage.
    Storage,
    /// Client-facing API.
    Client,
}

impl Context {
    /// All contexts, in pipeline order.
    pub const ALL: [Context; 3] = [Context::Ingestion, Context::Storage, Context::Client];

    /// Lowercase name used in tables and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingestion => "ingestion",
            Self::Storage => "storage",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ingestion" => Ok(Self::Ingestion),
            "storage" => Ok(Self::Storage),
            "client" => Ok(Self::Client),
            other => Err(format!(
                "unknown context '{other}' (expected ingestion, storage or client)"
            )),
        }
    }
}

/// Whether a field must, may, or cannot appear in a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Required,
    Optional,
    /// The field does not exist in this context.
    NotApplicable,
}

impl Requirement {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Required => "yes",
            Self::Optional => "no",
            Self::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Requirement of a field in each deployment context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRequirements {
    pub ingestion: Requirement,
    pub storage: Requirement,
    pub client: Requirement,
}

impl ContextRequirements {
    pub const fn new(ingestion: Requirement, storage: Requirement, client: Requirement) -> Self {
        Self {
            ingestion,
            storage,
            client,
        }
    }

    /// Required in every context.
    pub const fn always() -> Self {
        Self::new(
            Requirement::Required,
            Requirement::Required,
            Requirement::Required,
        )
    }

    /// Optional in every context.
    pub const fn optional() -> Self {
        Self::new(
            Requirement::Optional,
            Requirement::Optional,
            Requirement::Optional,
        )
    }

    /// Absent from every context.
    pub const fn never() -> Self {
        Self::new(
            Requirement::NotApplicable,
            Requirement::NotApplicable,
            Requirement::NotApplicable,
        )
    }

    pub fn get(&self, context: Context) -> Requirement {
        match context {
            Context::Ingestion => self.ingestion,
            Context::Storage => self.storage,
            Context::Client => self.client,
        }
    }

    /// `Some(true)` when required, `Some(false)` when optional and `None`
    /// when the field does not exist in `context`.
    pub fn required_in(&self, context: Context) -> Option<bool> {
        match self.get(context) {
            Requirement::Required => Some(true),
            Requirement::Optional => Some(false),
            Requirement::NotApplicable => None,
        }
    }
}

impl Default for ContextRequirements {
    fn default() -> Self {
        Self::always()
    }
}

/// Physical unit carried by a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Milliseconds,
    Minutes,
    Units,
    UnitsPerHour,
    MgPerDl,
    MmolPerL,
    Grams,
    /// Dimensionless multiplier (0.5 = 50%).
    Fraction,
    None,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Milliseconds => "milliseconds",
            Self::Minutes => "minutes",
            Self::Units => "units",
            Self::UnitsPerHour => "units/hour",
            Self::MgPerDl => "mg/dL",
            Self::MmolPerL => "mmol/L",
            Self::Grams => "grams",
            Self::Fraction => "fraction",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Integer or floating-point representation of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericalType {
    Integer,
    Float,
}

impl fmt::Display for NumericalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
        }
    }
}

/// One end of a numeric range.
///
/// YAML accepts either a number (`min: 0`) or the name of another field
/// (`min: duration`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Literal(f64),
    /// Symbolic reference to another field of the same record.
    Field(String),
}

impl Bound {
    /// Resolve the bound to a number. Symbolic bounds resolve only when the
    /// referenced field is present on `record` and numeric.
    pub fn resolve(&self, record: Option<&Record>) -> Option<f64> {
        match self {
            Self::Literal(v) => Some(*v),
            Self::Field(name) => record
                .and_then(|r| r.get_path(name))
                .and_then(FieldValue::as_f64),
        }
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Field(_))
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Field(name) => write!(f, "`{name}`"),
        }
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Literal(value)
    }
}

impl From<i64> for Bound {
    fn from(value: i64) -> Self {
        Self::Literal(value as f64)
    }
}

impl From<i32> for Bound {
    fn from(value: i32) -> Self {
        Self::Literal(f64::from(value))
    }
}

impl From<&str> for Bound {
    fn from(value: &str) -> Self {
        Self::Field(value.to_string())
    }
}

/// Numeric contract of a field: representation, unit and inclusive range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericContract {
    pub numerical_type: NumericalType,
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
}

impl NumericContract {
    pub fn integer(unit: Unit) -> Self {
        Self {
            numerical_type: NumericalType::Integer,
            unit,
            min: None,
            max: None,
        }
    }

    pub fn float(unit: Unit) -> Self {
        Self {
            numerical_type: NumericalType::Float,
            unit,
            min: None,
            max: None,
        }
    }

    pub fn min(mut self, bound: impl Into<Bound>) -> Self {
        self.min = Some(bound.into());
        self
    }

    pub fn max(mut self, bound: impl Into<Bound>) -> Self {
        self.max = Some(bound.into());
        self
    }

    /// Check `value` against the contract.
    ///
    /// Symbolic bounds are checked only when `record` resolves them.
    pub fn check(&self, value: &FieldValue, record: Option<&Record>) -> Result<(), String> {
        let Some(number) = value.as_f64() else {
            return Err(format!("a {} number", self.numerical_type));
        };
        if self.numerical_type == NumericalType::Integer && !value.is_integral() {
            return Err(format!("an integer in {}", self.range_text()));
        }
        let below = self
            .min
            .as_ref()
            .and_then(|b| b.resolve(record))
            .is_some_and(|min| number < min);
        let above = self
            .max
            .as_ref()
            .and_then(|b| b.resolve(record))
            .is_some_and(|max| number > max);
        if below || above {
            return Err(self.range_text());
        }
        Ok(())
    }

    /// Human-readable `[min, max]` text; missing ends render as `-inf`/`inf`.
    pub fn range_text(&self) -> String {
        let min = self
            .min
            .as_ref()
            .map_or_else(|| "-inf".to_string(), Bound::to_string);
        let max = self
            .max
            .as_ref()
            .map_or_else(|| "inf".to_string(), Bound::to_string);
        format!("[{min}, {max}] {}", self.unit)
    }
}

/// JSON shape of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Object,
    Array,
    /// RFC 3339 date-time string with a zone designator.
    Timestamp,
    /// Zone-less device wall-clock time, `YYYY-MM-DDTHH:MM:SS`.
    LocalTimestamp,
    Any,
}

impl ValueKind {
    /// Whether `value` has this shape. Integers are accepted where floats are
    /// expected.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Self::Any, _) => true,
            (Self::String, FieldValue::String(_)) => true,
            (Self::Timestamp, FieldValue::String(s)) => {
                chrono::DateTime::parse_from_rfc3339(s).is_ok()
            }
            (Self::LocalTimestamp, FieldValue::String(s)) => {
                chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
            }
            (Self::Integer, v) => v.is_integral(),
            (Self::Float, FieldValue::Float(_) | FieldValue::Int(_)) => true,
            (Self::Boolean, FieldValue::Bool(_)) => true,
            (Self::Object, FieldValue::Object(_)) => true,
            (Self::Array, FieldValue::Array(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Timestamp => "timestamp",
            Self::LocalTimestamp => "local timestamp",
            Self::Any => "any",
        };
        f.write_str(s)
    }
}

/// Schema version a change annotation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidVersion(s.to_string());
        let trimmed = s.trim().trim_start_matches('v');
        let mut parts = trimmed.split('.');
        let mut next = || -> Result<u32, SchemaError> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| invalid()),
                None => Ok(0),
            }
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of historical change recorded against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    MadeOptional,
    MadeRequired,
    RangeChanged,
    PlannedImplementation,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::MadeOptional => "made optional",
            Self::MadeRequired => "made required",
            Self::RangeChanged => "range changed",
            Self::PlannedImplementation => "planned implementation",
        };
        f.write_str(s)
    }
}

/// A historical change to a field at a given schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeAnnotation {
    pub version: SchemaVersion,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChangeAnnotation {
    pub fn new(version: SchemaVersion, kind: ChangeKind) -> Self {
        Self {
            version,
            kind,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_in_distinguishes_optional_from_absent() {
        let reqs = ContextRequirements::new(
            Requirement::Required,
            Requirement::Optional,
            Requirement::NotApplicable,
        );
        assert_eq!(reqs.required_in(Context::Ingestion), Some(true));
        assert_eq!(reqs.required_in(Context::Storage), Some(false));
        assert_eq!(reqs.required_in(Context::Client), None);
    }

    #[test]
    fn test_context_from_str() {
        assert_eq!("Storage".parse::<Context>().unwrap(), Context::Storage);
        assert!("tideline".parse::<Context>().is_err());
    }

    #[test]
    fn test_numeric_contract_literal_bounds() {
        let contract = NumericContract::integer(Unit::Milliseconds)
            .min(0)
            .max(86_400_000);

        assert!(contract.check(&FieldValue::Int(0), None).is_ok());
        assert!(contract.check(&FieldValue::Int(86_400_000), None).is_ok());
        assert!(contract.check(&FieldValue::Int(86_400_001), None).is_err());
        assert!(contract.check(&FieldValue::Int(-1), None).is_err());
        // Integer contracts reject fractional values
        assert!(contract.check(&FieldValue::Float(1.5), None).is_err());
        assert!(contract
            .check(&FieldValue::String("1".to_string()), None)
            .is_err());
    }

    #[test]
    fn test_symbolic_bound_skipped_when_unresolvable() {
        let contract = NumericContract::integer(Unit::Milliseconds).min("duration");

        // No record to resolve against: documentation only
        assert!(contract.check(&FieldValue::Int(5), None).is_ok());

        let record = Record::builder("basal", "temp")
            .field("duration", FieldValue::Int(10))
            .build();
        assert!(contract.check(&FieldValue::Int(5), Some(&record)).is_err());
        assert!(contract.check(&FieldValue::Int(12), Some(&record)).is_ok());
    }

    #[test]
    fn test_range_text() {
        let contract = NumericContract::float(Unit::UnitsPerHour).min(0.0).max(20.0);
        assert_eq!(contract.range_text(), "[0, 20] units/hour");

        let contract = NumericContract::integer(Unit::Milliseconds).min("duration");
        assert_eq!(contract.range_text(), "[`duration`, inf] milliseconds");
    }

    #[test]
    fn test_schema_version_parse_and_order() {
        let a: SchemaVersion = "v1.2.0".parse().unwrap();
        let b: SchemaVersion = "1.10".parse().unwrap();
        assert_eq!(a, SchemaVersion::new(1, 2, 0));
        assert_eq!(b, SchemaVersion::new(1, 10, 0));
        assert!(a < b);
        assert_eq!(a.to_string(), "v1.2.0");
        assert!("1.x".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_value_kind_accepts() {
        assert!(ValueKind::Timestamp.accepts(&FieldValue::from("2016-05-04T08:18:06.425Z")));
        assert!(!ValueKind::Timestamp.accepts(&FieldValue::from("2016-05-04T08:18:06")));
        assert!(!ValueKind::Timestamp.accepts(&FieldValue::from("yesterday")));
        assert!(ValueKind::LocalTimestamp.accepts(&FieldValue::from("2016-05-04T01:18:06")));
        assert!(!ValueKind::LocalTimestamp.accepts(&FieldValue::from("2016-05-04T01:18:06Z")));
        assert!(ValueKind::Float.accepts(&FieldValue::Int(1)));
        assert!(!ValueKind::Integer.accepts(&FieldValue::Float(1.5)));
        assert!(!ValueKind::Boolean.accepts(&FieldValue::Null));
    }
}
