//! Command-line interface for device-data-model
//!
//! # Usage Examples
//!
//! ## Generate
//! ```bash
//! # 100 temp basal records, five minutes apart, for the ingestion context
//! device-data-model generate --type basal --sub-type temp \
//!   --count 100 --interval 5m --context ingestion \
//!   --start 2016-05-04T08:18:06.425Z --output basal.jsonl
//!
//! # Required fields only, with a site-specific override file
//! device-data-model generate --type bolus --sub-type normal \
//!   --optional-fields never --overrides overrides.yaml
//! ```
//!
//! ## Inspect
//! ```bash
//! device-data-model types
//! device-data-model summary --type basal --sub-type temp
//! device-data-model changelog --type bolus --sub-type dual/square
//! ```
//!
//! ## Validate
//! ```bash
//! # Exits non-zero when any record violates the storage contract
//! device-data-model validate --input basal.jsonl --context storage
//! ```
//!
//! ## Environment
//! - `DATA_MODEL_SEED`: default `--seed`
//! - `DATA_MODEL_CONTEXT`: default `--context`
//! - `RUST_LOG`: log filter (e.g. `RUST_LOG=info`)

use clap::{Parser, Subcommand};
use device_data_model::commands::catalog::{run_changelog, run_summary, run_types, DescribeArgs};
use device_data_model::commands::generate::{run_generate, GenerateArgs};
use device_data_model::commands::validate::{run_validate, ValidateArgs};

#[derive(Parser)]
#[command(name = "device-data-model")]
#[command(about = "Compose, generate and validate device data records")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate example records as JSON Lines
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Print the per-context contract table of a record variant
    Summary {
        #[command(flatten)]
        args: DescribeArgs,
    },

    /// Print the schema change log of a record variant
    Changelog {
        #[command(flatten)]
        args: DescribeArgs,
    },

    /// Validate JSON Lines records against their contracts
    Validate {
        #[command(flatten)]
        args: ValidateArgs,
    },

    /// List record types and their variants
    Types,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { args } => {
            let metrics = run_generate(args)?;
            tracing::info!(
                "Generation took {:?}, writing took {:?}",
                metrics.generation_duration,
                metrics.write_duration
            );
        }
        Commands::Summary { args } => run_summary(args)?,
        Commands::Changelog { args } => run_changelog(args)?,
        Commands::Validate { args } => run_validate(args)?,
        Commands::Types => run_types()?,
    }

    Ok(())
}
