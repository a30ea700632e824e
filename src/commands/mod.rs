//! Command handlers.
//!
//! - `catalog`: contract tables, change logs and the record type listing
//! - `generate`: seeded example records written as JSON Lines
//! - `validate`: exhaustive validation of a JSON Lines stream

pub mod catalog;
pub mod generate;
pub mod validate;

use crate::config::{OverrideConfig, OverrideResolver};
use crate::{OverrideOpts, RecordSelection};
use anyhow::Context;
use model_core::{Catalog, EffectiveSchema};

/// Load and check the override file named by `opts`.
pub(crate) fn load_overrides(catalog: &Catalog, opts: &OverrideOpts) -> anyhow::Result<OverrideConfig> {
    let config = OverrideConfig::load(opts.overrides.as_deref())?;
    config
        .check(catalog)
        .with_context(|| format!("Invalid overrides in {:?}", opts.overrides))?;
    Ok(config)
}

/// Resolve the selected variant with overrides composed in.
pub(crate) fn resolve_schema(
    catalog: &Catalog,
    config: &OverrideConfig,
    selection: &RecordSelection,
) -> anyhow::Result<EffectiveSchema> {
    let record_type = catalog.record_type(&selection.record_type)?;
    let variant = selection.variant(record_type)?;
    let schema = OverrideResolver::new(catalog, config)
        .effective_schema(&record_type.name, variant)
        .with_context(|| format!("Failed to resolve schema for {}/{variant}", record_type.name))?;
    Ok(schema)
}
