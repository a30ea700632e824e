//! Bolus insulin delivery, selected by `subType`.

use model_core::{
    ChangeAnnotation, ChangeKind, ExampleValue, FieldDescriptor, NumericContract, PostProcessing,
    RecordType, SchemaFragment, SchemaVersion, Unit, ValueKind, VariantDefinition,
};

/// Largest single bolus in units.
pub const MAX_UNITS: f64 = 100.0;

const MAX_DURATION_MS: i64 = 86_400_000;

pub fn bolus() -> RecordType {
    RecordType::new("bolus", "subType")
        .base(
            SchemaFragment::new("bolus").field(
                "type",
                FieldDescriptor::new(ValueKind::String, ExampleValue::literal("bolus"))
                    .allowed(["bolus"]),
            ),
        )
        .variant(
            "normal",
            VariantDefinition::new(
                SchemaFragment::new("bolus-normal")
                    .field("normal", amount())
                    .field("expectedNormal", expected_amount("normal")),
            )
            .with_post(PostProcessing::default().multiple("expectedNormal", "normal", 1.5)),
        )
        .variant(
            "square",
            VariantDefinition::new(extended(SchemaFragment::new("bolus-square")))
                .with_post(extended_post()),
        )
        .variant(
            "dual/square",
            VariantDefinition::new(
                extended(SchemaFragment::new("bolus-dual"))
                    .field("normal", amount())
                    .field("expectedNormal", expected_amount("normal")),
            )
            .with_post(extended_post().multiple("expectedNormal", "normal", 1.5)),
        )
}

fn extended(fragment: SchemaFragment) -> SchemaFragment {
    fragment
        .field("extended", amount())
        .field("expectedExtended", expected_amount("extended"))
        .field(
            "duration",
            FieldDescriptor::new(
                ValueKind::Integer,
                ExampleValue::IntRange {
                    min: 1_800_000,
                    max: 28_800_000,
                },
            )
            .numeric(
                NumericContract::integer(Unit::Milliseconds)
                    .min(0)
                    .max(MAX_DURATION_MS),
            ),
        )
        .field(
            "expectedDuration",
            FieldDescriptor::new(ValueKind::Integer, ExampleValue::Derived)
                .numeric(
                    NumericContract::integer(Unit::Milliseconds)
                        .min("duration")
                        .max(MAX_DURATION_MS),
                )
                .optional()
                .change(ChangeAnnotation::new(
                    SchemaVersion::new(1, 2, 0),
                    ChangeKind::Added,
                )),
        )
}

fn extended_post() -> PostProcessing {
    PostProcessing::default()
        .multiple("expectedExtended", "extended", 1.2)
        .multiple("expectedDuration", "duration", 1.2)
}

fn amount() -> FieldDescriptor {
    FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(0.1, 10.0, 2))
        .numeric(NumericContract::float(Unit::Units).min(0.0).max(MAX_UNITS))
}

/// Programmed amount of an interrupted bolus; at least the delivered `of`.
fn expected_amount(of: &str) -> FieldDescriptor {
    FieldDescriptor::new(ValueKind::Float, ExampleValue::Derived)
        .numeric(NumericContract::float(Unit::Units).min(of).max(MAX_UNITS))
        .optional()
        .describe(format!("Programmed {of} amount when the bolus was interrupted"))
        .change(
            ChangeAnnotation::new(SchemaVersion::new(1, 2, 0), ChangeKind::Added)
                .with_note("interrupted boluses"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library;
    use model_core::SchemaError;

    #[test]
    fn test_discriminant_allows_every_sub_type() {
        let schema = bolus().effective_schema(&library(), "dual/square").unwrap();
        let sub_type = schema.get_field("subType").unwrap();
        assert_eq!(
            sub_type.contract.allowed.as_ref().map(Vec::len),
            Some(3)
        );
        assert!(schema.get_field("normal").is_some());
        assert!(schema.get_field("extended").is_some());
    }

    #[test]
    fn test_normal_has_no_extended_fields() {
        let schema = bolus().effective_schema(&library(), "normal").unwrap();
        assert!(schema.get_field("extended").is_none());
        assert!(schema.get_field("duration").is_none());
    }

    #[test]
    fn test_unknown_sub_type() {
        let err = bolus().effective_schema(&library(), "injected").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownVariant { ref known, .. } if known.len() == 3));
    }
}
