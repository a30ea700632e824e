//! Validate command handler.

use super::load_overrides;
use crate::config::OverrideResolver;
use crate::OverrideOpts;
use anyhow::Context as _;
use clap::Args;
use model_core::Context;
use record_verify::{BatchReport, BatchVerifier};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Arguments of the `validate` command.
#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// JSONL input file; stdin when omitted
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Deployment context: ingestion, storage or client
    #[arg(long, env = "DATA_MODEL_CONTEXT", default_value = "storage")]
    pub context: Context,

    /// Maximum number of failing records to print
    #[arg(long, default_value = "20")]
    pub max_failures: usize,

    #[command(flatten)]
    pub overrides: OverrideOpts,
}

/// Validate every record of the input, resolving each schema from the
/// record's own `type` and discriminant fields.
pub fn validate_input(args: &ValidateArgs) -> anyhow::Result<BatchReport> {
    let catalog = record_types::catalog();
    let config = load_overrides(&catalog, &args.overrides)?;
    let resolver = OverrideResolver::new(&catalog, &config);
    let mut verifier = BatchVerifier::with_resolver(&resolver, &catalog, args.context);

    let report = match &args.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {path:?}"))?;
            verifier
                .verify_reader(BufReader::new(file))
                .with_context(|| format!("Failed to read {path:?}"))?
        }
        None => verifier
            .verify_reader(std::io::stdin().lock())
            .context("Failed to read stdin")?,
    };
    Ok(report)
}

/// Run the validate command; fails when any record is invalid.
pub fn run_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let report = validate_input(&args)?;

    for failure in report.failures.iter().take(args.max_failures) {
        println!("{failure}");
    }
    if report.failures.len() > args.max_failures {
        println!(
            "... {} more failing record(s)",
            report.failures.len() - args.max_failures
        );
    }
    println!("{}", report.summary());

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} record(s) failed validation",
            report.invalid(),
            report.total
        );
    }
    Ok(())
}
