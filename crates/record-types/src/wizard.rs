//! Bolus calculator (wizard) events.

use model_core::{
    ChangeAnnotation, ChangeKind, ContextRequirements, ExampleValue, FieldDescriptor, FieldValue,
    NumericContract, RecordType, SchemaFragment, SchemaVersion, Unit, ValueKind,
};
use model_core::Requirement::{Optional, Required};

use crate::object;

pub fn wizard() -> RecordType {
    RecordType::single(
        "wizard",
        SchemaFragment::new("wizard")
            .field(
                "type",
                FieldDescriptor::new(ValueKind::String, ExampleValue::literal("wizard"))
                    .allowed(["wizard"]),
            )
            .field(
                "bolus",
                FieldDescriptor::new(ValueKind::String, ExampleValue::HexId { length: 32 })
                    .requirements(ContextRequirements::new(Optional, Required, Required))
                    .describe("Id of the bolus the calculator recommended"),
            )
            .field(
                "carbInput",
                FieldDescriptor::new(ValueKind::Integer, ExampleValue::IntRange { min: 0, max: 150 })
                    .numeric(NumericContract::integer(Unit::Grams).min(0).max(1000)),
            )
            .field(
                "insulinCarbRatio",
                FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(5.0, 25.0, 1))
                    .numeric(NumericContract::float(Unit::Grams).min(0.0).max(250.0)),
            )
            .field(
                "insulinSensitivity",
                FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(1.0, 5.0, 5))
                    .numeric(NumericContract::float(Unit::MmolPerL).min(0.0).max(55.0)),
            )
            .field(
                "insulinOnBoard",
                FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(0.0, 5.0, 2))
                    .numeric(NumericContract::float(Unit::Units).min(0.0).max(250.0))
                    .optional(),
            )
            .field(
                "bgTarget",
                FieldDescriptor::new(
                    ValueKind::Object,
                    ExampleValue::literal(object([
                        ("low", FieldValue::Float(4.44065)),
                        ("high", FieldValue::Float(7.77114)),
                    ])),
                )
                .change(
                    ChangeAnnotation::new(
                        SchemaVersion::new(1, 4, 0),
                        ChangeKind::PlannedImplementation,
                    )
                    .with_note("per-manufacturer target shapes"),
                ),
            )
            .field(
                "units",
                FieldDescriptor::new(ValueKind::String, ExampleValue::literal("mmol/L"))
                    .allowed(["mmol/L"]),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library;
    use model_core::Context;

    #[test]
    fn test_bolus_link_optional_on_ingestion() {
        let schema = wizard().effective_schema(&library(), "wizard").unwrap();
        assert!(!schema.required_in(Context::Ingestion).contains(&"bolus"));
        assert!(schema.required_in(Context::Client).contains(&"bolus"));
    }
}
