//! Contract tables, change logs and validation for device data records.
//!
//! All operations are pure functions of an
//! [`EffectiveSchema`](model_core::EffectiveSchema):
//!
//! - [`extract_summary`] - one row per field with its per-context contract
//! - [`extract_change_log`] - change annotations ordered by schema version
//! - [`validate`] - exhaustive validation of a record for one context
//!
//! [`BatchVerifier`] applies [`validate`] to a JSON Lines stream, resolving
//! each record's schema from its `type` and discriminant fields.
//!
//! # Example
//!
//! ```ignore
//! use model_core::Context;
//! use record_verify::validate_json;
//!
//! let schema = catalog.effective_schema("basal", "temp")?;
//! let report = validate_json(&schema, record_json, Context::Storage)?;
//! for violation in report.violations() {
//!     println!("{violation}");
//! }
//! ```

pub mod changelog;
pub mod error;
pub mod report;
pub mod summary;
pub mod validator;
pub mod verifier;

pub use changelog::{extract_change_log, render_change_log, ChangeEntry};
pub use error::VerifyError;
pub use report::{BatchReport, LineFailure, ValidationReport, Violation};
pub use summary::{extract_summary, ContractRow, ContractTable};
pub use validator::{record_from_json, validate, validate_json};
pub use verifier::{BatchVerifier, SchemaResolver};
