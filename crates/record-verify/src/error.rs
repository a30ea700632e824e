//! Error types for record verification.

use crate::report::ValidationReport;
use model_core::SchemaError;
use thiserror::Error;

/// Errors that can occur during verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Record type or variant could not be resolved.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading input failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record must be a JSON object.
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(String),

    /// Record does not carry the field that selects its schema.
    #[error("Record has no string '{0}' field")]
    MissingSelector(String),

    /// Record violates its contract.
    #[error("{0}")]
    Invalid(ValidationReport),
}
