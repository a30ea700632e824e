//! Field overrides loaded from a YAML file.
//!
//! Overrides are composed after the variant fragment, so they replace
//! catalog fields by name or add new ones:
//!
//! ```yaml
//! overrides:
//!   - record_type: basal
//!     variant: temp
//!     fields:
//!       rate:
//!         example:
//!           type: float_range
//!           min: 0.0
//!           max: 1.0
//!         kind: float
//!         numeric:
//!           numerical_type: float
//!           unit: units_per_hour
//!           min: 0
//!           max: 20
//! ```

use anyhow::Context;
use model_core::{Catalog, EffectiveSchema, FieldDescriptor, SchemaError, SchemaFragment};
use record_verify::SchemaResolver;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Every override in one file, applied in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideConfig {
    #[serde(default)]
    pub overrides: Vec<FieldOverride>,
}

/// Field descriptors replacing or extending one record type's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOverride {
    pub record_type: String,

    /// Variant the override is limited to; every variant when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    pub fields: BTreeMap<String, FieldDescriptor>,
}

impl FieldOverride {
    pub fn applies_to(&self, record_type: &str, variant: &str) -> bool {
        self.record_type == record_type && self.variant.as_deref().is_none_or(|v| v == variant)
    }

    fn fragment(&self) -> SchemaFragment {
        let name = match &self.variant {
            Some(variant) => format!("override:{}/{variant}", self.record_type),
            None => format!("override:{}", self.record_type),
        };
        SchemaFragment {
            name,
            fields: self.fields.clone(),
        }
    }
}

impl OverrideConfig {
    /// Load overrides from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read overrides file: {path:?}"))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse overrides YAML: {path:?}"))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load `path` when given, otherwise an empty configuration.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Ok(path.map(Self::from_file).transpose()?.unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Override fragments for one variant, in file order.
    pub fn fragments_for(&self, record_type: &str, variant: &str) -> Vec<SchemaFragment> {
        self.overrides
            .iter()
            .filter(|o| o.applies_to(record_type, variant))
            .map(FieldOverride::fragment)
            .collect()
    }

    /// Check that every override names a record type and variant of `catalog`.
    pub fn check(&self, catalog: &Catalog) -> Result<(), SchemaError> {
        for entry in &self.overrides {
            let record_type = catalog.record_type(&entry.record_type)?;
            if let Some(variant) = &entry.variant {
                record_type.get_variant(variant)?;
            }
        }
        Ok(())
    }
}

/// Resolves catalog schemas with the configured overrides composed in.
pub struct OverrideResolver<'a> {
    catalog: &'a Catalog,
    config: &'a OverrideConfig,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a OverrideConfig) -> Self {
        Self { catalog, config }
    }

    pub fn effective_schema(
        &self,
        record_type: &str,
        variant: &str,
    ) -> Result<EffectiveSchema, SchemaError> {
        self.catalog
            .record_type(record_type)?
            .effective_schema_with(&self.catalog.library, variant, |composed| {
                let overrides = self.config.fragments_for(record_type, composed);
                if !overrides.is_empty() {
                    tracing::debug!(
                        "Applying {} override fragment(s) to {record_type}/{composed}",
                        overrides.len()
                    );
                }
                overrides
            })
    }
}

impl SchemaResolver for OverrideResolver<'_> {
    fn resolve(&self, record_type: &str, variant: &str) -> Result<EffectiveSchema, SchemaError> {
        self.effective_schema(record_type, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_core::{Bound, ExampleValue};

    const OVERRIDES: &str = r#"
overrides:
  - record_type: basal
    variant: temp
    fields:
      rate:
        example:
          type: float_range
          min: 0.0
          max: 1.0
          decimals: 2
        kind: float
        numeric:
          numerical_type: float
          unit: units_per_hour
          min: 0
          max: 20
  - record_type: basal
    fields:
      site:
        example:
          type: literal
          value: abdomen
        kind: string
        requirements:
          ingestion: optional
          storage: optional
          client: not_applicable
"#;

    #[test]
    fn test_parse_override_config() {
        let config = OverrideConfig::from_yaml(OVERRIDES).unwrap();
        assert_eq!(config.overrides.len(), 2);
        assert_eq!(config.overrides[0].variant.as_deref(), Some("temp"));
        assert!(config.overrides[1].variant.is_none());

        let rate = &config.overrides[0].fields["rate"];
        assert!(matches!(rate.example, ExampleValue::FloatRange { max, .. } if max == 1.0));
        assert_eq!(
            rate.contract.numeric.as_ref().and_then(|n| n.max.clone()),
            Some(Bound::from(20))
        );
    }

    #[test]
    fn test_fragments_for_matches_variant() {
        let config = OverrideConfig::from_yaml(OVERRIDES).unwrap();

        let temp = config.fragments_for("basal", "temp");
        let names: Vec<_> = temp.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["override:basal/temp", "override:basal"]);

        assert_eq!(config.fragments_for("basal", "scheduled").len(), 1);
        assert!(config.fragments_for("bolus", "normal").is_empty());
    }

    #[test]
    fn test_resolver_composes_overrides_last() {
        let catalog = record_types::catalog();
        let config = OverrideConfig::from_yaml(OVERRIDES).unwrap();
        config.check(&catalog).unwrap();
        let resolver = OverrideResolver::new(&catalog, &config);

        let schema = resolver.resolve("basal", "temp").unwrap();
        let rate = schema.get_field("rate").unwrap();
        assert!(matches!(rate.example, ExampleValue::FloatRange { max, .. } if max == 1.0));
        assert!(schema.get_field("site").is_some());

        let plain = catalog.effective_schema("basal", "temp").unwrap();
        assert!(plain.get_field("site").is_none());
    }

    #[test]
    fn test_type_wide_override_reaches_sub_record() {
        let config = OverrideConfig::from_yaml(
            r#"
overrides:
  - record_type: basal
    fields:
      rate:
        example:
          type: float_range
          min: 0.0
          max: 1.0
        kind: float
        numeric:
          numerical_type: float
          unit: units_per_hour
          min: 0
          max: 1
"#,
        )
        .unwrap();
        let catalog = record_types::catalog();
        let resolver = OverrideResolver::new(&catalog, &config);

        let max_of = |schema: &EffectiveSchema, field: &str| {
            schema
                .get_field(field)
                .and_then(|d| d.contract.numeric.as_ref())
                .and_then(|n| n.max.clone())
        };
        let scheduled = resolver.resolve("basal", "scheduled").unwrap();
        assert_eq!(max_of(&scheduled, "rate"), Some(Bound::from(1)));

        let temp = resolver.resolve("basal", "temp").unwrap();
        let suppressed = &temp.nested_schema("suppressed").unwrap().schema;
        assert_eq!(max_of(suppressed, "rate"), Some(Bound::from(1)));

        let nested_contract = temp
            .get_field("suppressed")
            .and_then(|d| d.contract.nested.as_ref())
            .unwrap();
        let rate = &nested_contract.fields["rate"];
        assert_eq!(rate.numeric.as_ref().and_then(|n| n.max.clone()), Some(Bound::from(1)));
    }

    #[test]
    fn test_variant_override_stays_out_of_sub_record() {
        let config = OverrideConfig::from_yaml(OVERRIDES).unwrap();
        let catalog = record_types::catalog();
        let temp = OverrideResolver::new(&catalog, &config)
            .resolve("basal", "temp")
            .unwrap();

        // `site` is a type-wide override, so the scheduled sub-record composes
        // it too, but the whitelist keeps it off the sub-record
        let suppressed = &temp.nested_schema("suppressed").unwrap().schema;
        assert!(suppressed.get_field("site").is_none());
        assert!(matches!(
            suppressed.get_field("rate").unwrap().example,
            ExampleValue::FloatRange { max, .. } if max == 5.0
        ));
    }

    #[test]
    fn test_check_rejects_unknown_variant() {
        let config = OverrideConfig::from_yaml(
            "overrides:\n  - record_type: basal\n    variant: extended\n    fields: {}\n",
        )
        .unwrap();
        let err = config.check(&record_types::catalog()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownVariant { .. }));
    }

    #[test]
    fn test_load_without_path_is_empty() {
        assert!(OverrideConfig::load(None).unwrap().is_empty());
    }
}
