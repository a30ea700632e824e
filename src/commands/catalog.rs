//! Catalog inspection commands: summary, changelog and types.

use super::{load_overrides, resolve_schema};
use crate::{OverrideOpts, RecordSelection};
use clap::Args;
use model_core::{Catalog, EffectiveSchema};
use record_verify::{extract_change_log, extract_summary, render_change_log};

/// Arguments of the `summary` and `changelog` commands.
#[derive(Args, Clone, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub selection: RecordSelection,

    #[command(flatten)]
    pub overrides: OverrideOpts,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl DescribeArgs {
    pub fn schema(&self) -> anyhow::Result<EffectiveSchema> {
        let catalog = record_types::catalog();
        let config = load_overrides(&catalog, &self.overrides)?;
        resolve_schema(&catalog, &config, &self.selection)
    }
}

/// Print the contract table of one variant.
pub fn run_summary(args: DescribeArgs) -> anyhow::Result<()> {
    let schema = args.schema()?;
    tracing::info!(
        "Contract summary for {}/{} ({} fields)",
        schema.record_type,
        schema.variant,
        schema.fields.len()
    );
    let table = extract_summary(&schema);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("{}", table.render());
    }
    Ok(())
}

/// Print the change log of one variant.
pub fn run_changelog(args: DescribeArgs) -> anyhow::Result<()> {
    let schema = args.schema()?;
    let entries = extract_change_log(&schema);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No changes recorded for {}/{}", schema.record_type, schema.variant);
    } else {
        println!("{}", render_change_log(&entries));
    }
    Ok(())
}

/// One line per record type: name, discriminant field and variants.
pub fn describe_types(catalog: &Catalog) -> Vec<String> {
    catalog
        .record_types()
        .map(|record_type| match &record_type.discriminant {
            Some(field) => format!(
                "{} ({field}): {}",
                record_type.name,
                record_type.variant_names().join(", ")
            ),
            None => record_type.name.clone(),
        })
        .collect()
}

/// Print every record type of the catalog.
pub fn run_types() -> anyhow::Result<()> {
    for line in describe_types(&record_types::catalog()) {
        println!("{line}");
    }
    Ok(())
}
