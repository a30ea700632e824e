//! Catalog of device data record types.
//!
//! Every record type composes the common [`envelope`](envelope::envelope)
//! with its own fragments. The catalog is plain data built on the
//! `model-core` primitives; nothing here generates or validates records.
//!
//! | record type | discriminant | variants |
//! |---|---|---|
//! | `basal` | `deliveryType` | `scheduled`, `temp`, `suspend` |
//! | `bolus` | `subType` | `normal`, `square`, `dual/square` |
//! | `cbg` | - | `cbg` |
//! | `smbg` | - | `smbg` |
//! | `wizard` | - | `wizard` |
//!
//! # Example
//!
//! ```rust
//! let catalog = record_types::catalog();
//! let temp = catalog.effective_schema("basal", "temp").unwrap();
//! assert!(temp.nested_schema("suppressed").is_some());
//! ```

pub mod basal;
pub mod bolus;
pub mod envelope;
pub mod glucose;
pub mod wizard;

use model_core::{Catalog, FieldValue, FragmentLibrary};

/// Fragment library every catalog record type composes against.
pub fn library() -> FragmentLibrary {
    FragmentLibrary::new(envelope::envelope()).with_shared(glucose::blood_glucose())
}

/// All record types, keyed by name.
pub fn catalog() -> Catalog {
    Catalog::new(library())
        .with(basal::basal())
        .with(bolus::bolus())
        .with(glucose::cbg())
        .with(glucose::smbg())
        .with(wizard::wizard())
}

pub(crate) fn object<const N: usize>(pairs: [(&str, FieldValue); N]) -> FieldValue {
    FieldValue::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names() {
        assert_eq!(
            catalog().names(),
            vec!["basal", "bolus", "cbg", "smbg", "wizard"]
        );
    }

    #[test]
    fn test_every_variant_resolves() {
        let catalog = catalog();
        for record_type in catalog.record_types() {
            for variant in record_type.variant_names() {
                let schema = catalog.effective_schema(&record_type.name, variant).unwrap();
                assert_eq!(schema.variant, variant);
                assert!(schema.get_field("time").is_some());
            }
        }
    }
}
