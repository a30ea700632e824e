//! Device Data Model Library
//!
//! Command-line plumbing around the device data model engine crates.
//!
//! # Engine Crates
//!
//! - `model_core` - contract model, schema fragments and the composition engine
//! - `record_generator` - seeded example-record generation
//! - `record_verify` - contract tables, change logs and exhaustive validation
//! - `record_types` - the catalog: envelope, basal, bolus, cbg, smbg, wizard
//!
//! # CLI Usage
//!
//! ```bash
//! # Ten temp basal records for the storage context, one JSON object per line
//! device-data-model generate --type basal --sub-type temp --count 10 --context storage
//!
//! # Contract table of a single-variant record type
//! device-data-model summary --type cbg
//!
//! # Validate a JSONL file against the ingestion contract
//! device-data-model validate --input records.jsonl --context ingestion
//! ```

use clap::{Args, ValueEnum};
use model_core::RecordType;
use record_generator::OptionalFieldPolicy;
use std::path::PathBuf;

pub mod commands;
pub mod config;
pub mod output;

/// Record type and variant selection shared by several commands.
#[derive(Args, Clone, Debug)]
pub struct RecordSelection {
    /// Record type name (e.g. basal, bolus, cbg, smbg, wizard)
    #[arg(long = "type", short = 't')]
    pub record_type: String,

    /// Variant name (e.g. temp); may be omitted for single-variant types
    #[arg(long)]
    pub sub_type: Option<String>,
}

impl RecordSelection {
    /// Variant named by `--sub-type`, or the only variant of `record_type`.
    pub fn variant<'a>(&'a self, record_type: &'a RecordType) -> anyhow::Result<&'a str> {
        if let Some(sub_type) = &self.sub_type {
            return Ok(sub_type.as_str());
        }
        match record_type.variant_names().as_slice() {
            [only] => Ok(*only),
            variants => anyhow::bail!(
                "Record type '{}' needs --sub-type (one of: {})",
                record_type.name,
                variants.join(", ")
            ),
        }
    }
}

/// Optional YAML override file.
#[derive(Args, Clone, Debug, Default)]
pub struct OverrideOpts {
    /// YAML file with field overrides composed after the catalog fragments
    #[arg(long, value_name = "PATH")]
    pub overrides: Option<PathBuf>,
}

/// How optional fields are treated during generation.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptionalFields {
    /// Emit every optional field
    #[default]
    Always,
    /// Emit only required fields
    Never,
    /// Emit each optional field with --optional-probability
    Sometimes,
}

impl OptionalFields {
    pub fn policy(self, probability: f64) -> anyhow::Result<OptionalFieldPolicy> {
        Ok(match self {
            Self::Always => OptionalFieldPolicy::Always,
            Self::Never => OptionalFieldPolicy::Never,
            Self::Sometimes => {
                if !(0.0..=1.0).contains(&probability) {
                    anyhow::bail!("Optional field probability must be in [0, 1], got {probability}");
                }
                OptionalFieldPolicy::Sometimes(probability)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_defaults_single_variant() {
        let catalog = record_types::catalog();
        let selection = RecordSelection {
            record_type: "cbg".to_string(),
            sub_type: None,
        };
        let cbg = catalog.record_type("cbg").unwrap();
        assert_eq!(selection.variant(cbg).unwrap(), "cbg");

        let basal = catalog.record_type("basal").unwrap();
        let err = selection.variant(basal).unwrap_err();
        assert!(err.to_string().contains("scheduled, suspend, temp"));
    }

    #[test]
    fn test_optional_fields_policy() {
        assert_eq!(
            OptionalFields::Sometimes.policy(0.25).unwrap(),
            OptionalFieldPolicy::Sometimes(0.25)
        );
        assert_eq!(
            OptionalFields::Never.policy(2.0).unwrap(),
            OptionalFieldPolicy::Never
        );
        assert!(OptionalFields::Sometimes.policy(1.5).is_err());
    }
}
