//! Validation report types.

use crate::error::VerifyError;
use model_core::{Context, FieldValue};
use std::fmt;

/// A single contract violation.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Value present but outside its contract (kind, range, integer-ness,
    /// allowed set).
    ConstraintViolation {
        field: String,
        value: FieldValue,
        expected: String,
    },

    /// Field required in the context but absent.
    MissingRequiredField { field: String, context: Context },

    /// Field present although it does not exist in the context.
    NotApplicable { field: String, context: Context },

    /// Field not declared by the effective schema.
    UnknownField { field: String },
}

impl Violation {
    /// Dotted path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::ConstraintViolation { field, .. }
            | Self::MissingRequiredField { field, .. }
            | Self::NotApplicable { field, .. }
            | Self::UnknownField { field } => field,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstraintViolation {
                field,
                value,
                expected,
            } => write!(f, "{field}: {value} violates contract, expected {expected}"),
            Self::MissingRequiredField { field, context } => {
                write!(f, "{field}: required in {context} but missing")
            }
            Self::NotApplicable { field, context } => {
                write!(f, "{field}: present but not applicable in {context}")
            }
            Self::UnknownField { field } => write!(f, "{field}: not part of the schema"),
        }
    }
}

/// Every violation found in one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub record_type: String,
    pub variant: String,
    pub context: Context,
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new(record_type: impl Into<String>, variant: impl Into<String>, context: Context) -> Self {
        Self {
            record_type: record_type.into(),
            variant: variant.into(),
            context,
            violations: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations of one field, by dotted path.
    pub fn violations_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.field() == field)
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// `Ok` when valid, otherwise the whole report as an error.
    pub fn into_result(self) -> Result<(), VerifyError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(VerifyError::Invalid(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}): {} violation(s)",
            self.record_type,
            self.variant,
            self.context,
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// A line of a batch that did not validate.
#[derive(Debug)]
pub enum LineFailure {
    /// Record resolved to a schema and violates it
    Invalid { line: u64, report: ValidationReport },
    /// Record could not be parsed or its schema resolved
    Unresolved { line: u64, error: VerifyError },
}

impl fmt::Display for LineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { line, report } => write!(f, "line {line}: {report}"),
            Self::Unresolved { line, error } => write!(f, "line {line}: {error}"),
        }
    }
}

/// Outcome of validating a stream of records.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of records read.
    pub total: u64,
    /// Number of records without violations.
    pub valid: u64,
    /// Details of every failing line.
    pub failures: Vec<LineFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn invalid(&self) -> u64 {
        self.total - self.valid
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!("Validation PASSED: {}/{} records valid", self.valid, self.total)
        } else {
            format!(
                "Validation FAILED: {} of {} records invalid",
                self.invalid(),
                self.total
            )
        }
    }
}
