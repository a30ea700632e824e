//! Generate command handler.

use super::{load_overrides, resolve_schema};
use crate::config::parse_interval;
use crate::output::{write_jsonl, WriteMetrics};
use crate::{OptionalFields, OverrideOpts, RecordSelection};
use anyhow::Context as _;
use chrono::Utc;
use clap::Args;
use model_core::Context;
use record_generator::{parse_timestamp, RecordGenerator};
use std::fs::File;
use std::path::PathBuf;

/// Arguments of the `generate` command.
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub selection: RecordSelection,

    /// Number of records to generate
    #[arg(long, short = 'n', default_value = "1")]
    pub count: u64,

    /// Random seed for deterministic generation (same seed = same records)
    #[arg(long, env = "DATA_MODEL_SEED", default_value = "42")]
    pub seed: u64,

    /// Deployment context: ingestion, storage or client
    #[arg(long, env = "DATA_MODEL_CONTEXT", default_value = "storage")]
    pub context: Context,

    /// Timestamp of the first record (RFC 3339); defaults to now
    #[arg(long)]
    pub start: Option<String>,

    /// Spacing between record timestamps (e.g. "500ms", "30s", "5m", "1h")
    #[arg(long, default_value = "5m")]
    pub interval: String,

    /// Treatment of optional fields
    #[arg(long, value_enum, default_value_t = OptionalFields::Always)]
    pub optional_fields: OptionalFields,

    /// Inclusion probability for `--optional-fields sometimes`
    #[arg(long, default_value = "0.5")]
    pub optional_probability: f64,

    /// Output JSONL file; stdout when omitted
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideOpts,
}

/// Run the generate command.
pub fn run_generate(args: GenerateArgs) -> anyhow::Result<WriteMetrics> {
    let catalog = record_types::catalog();
    let config = load_overrides(&catalog, &args.overrides)?;
    let schema = resolve_schema(&catalog, &config, &args.selection)?;

    let start = match &args.start {
        Some(s) => parse_timestamp(s).with_context(|| format!("Invalid --start timestamp: {s}"))?,
        None => Utc::now(),
    };
    let interval = parse_interval(&args.interval)?;
    let policy = args.optional_fields.policy(args.optional_probability)?;

    tracing::info!(
        "Generating {} {}/{} record(s) for context '{}' (seed={})",
        args.count,
        schema.record_type,
        schema.variant,
        args.context,
        args.seed
    );

    let mut generator = RecordGenerator::new(args.seed).with_optional_fields(policy);
    let records = generator.generate_many(&schema, start, interval, args.context, args.count);

    let metrics = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {path:?}"))?;
            write_jsonl(file, records)
                .with_context(|| format!("Failed to write records to {path:?}"))?
        }
        None => write_jsonl(std::io::stdout().lock(), records)
            .context("Failed to write records to stdout")?,
    };
    Ok(metrics)
}
