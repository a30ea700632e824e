//! Command-line configuration: record-type overrides and interval parsing.

mod interval;
mod overrides;

pub use interval::parse_interval;
pub use overrides::{FieldOverride, OverrideConfig, OverrideResolver};
