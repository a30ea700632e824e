//! Basal insulin delivery.
//!
//! Variants are selected by `deliveryType`:
//!
//! - `scheduled` - delivery following the active basal schedule
//! - `temp` - temporary rate or percentage of the scheduled rate
//! - `suspend` - delivery stopped
//!
//! `temp` and `suspend` embed the scheduled delivery they replace as
//! `suppressed`.

use model_core::{
    ChangeAnnotation, ChangeKind, ContextRequirements, ExampleValue, FieldDescriptor, FieldValue,
    NumericContract, PostProcessing, RecordType, SchemaFragment, SchemaVersion, Unit, ValueKind,
    VariantDefinition,
};
use model_core::Requirement::{NotApplicable as NA, Optional};

use crate::object;

/// Longest basal segment in milliseconds (one day).
pub const MAX_DURATION_MS: i64 = 86_400_000;

/// Upper bound of a basal rate in units/hour.
pub const MAX_RATE: f64 = 20.0;

/// Fields of the scheduled delivery kept on a `suppressed` sub-record.
pub const SUPPRESSED_FIELDS: [&str; 4] = ["type", "deliveryType", "scheduleName", "rate"];

pub fn basal() -> RecordType {
    RecordType::new("basal", "deliveryType")
        .base(base())
        .variant(
            "scheduled",
            VariantDefinition::new(scheduled())
                .with_post(PostProcessing::default().remove("previous")),
        )
        .variant(
            "temp",
            VariantDefinition::new(temp()).with_post(
                PostProcessing::default()
                    .remove("previous")
                    .nested("suppressed", "scheduled", SUPPRESSED_FIELDS)
                    .product("rate", "percent", "suppressed.rate")
                    .multiple("expectedDuration", "duration", 1.2),
            ),
        )
        .variant(
            "suspend",
            VariantDefinition::new(suspend()).with_post(
                PostProcessing::default()
                    .remove("previous")
                    .nested("suppressed", "scheduled", SUPPRESSED_FIELDS)
                    .multiple("expectedDuration", "duration", 1.2),
            ),
        )
}

fn base() -> SchemaFragment {
    SchemaFragment::new("basal")
        .field(
            "type",
            FieldDescriptor::new(ValueKind::String, ExampleValue::literal("basal"))
                .allowed(["basal"]),
        )
        .field(
            "duration",
            FieldDescriptor::new(
                ValueKind::Integer,
                ExampleValue::IntRange {
                    min: 0,
                    max: MAX_DURATION_MS,
                },
            )
            .numeric(duration_contract())
            .change(
                ChangeAnnotation::new(SchemaVersion::new(1, 4, 0), ChangeKind::RangeChanged)
                    .with_note("upper bound raised from 43200000 to 86400000"),
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
                .describe("Programmed duration when delivery ended early")
                .change(ChangeAnnotation::new(
                    SchemaVersion::new(1, 2, 0),
                    ChangeKind::Added,
                )),
        )
        .field(
            "previous",
            FieldDescriptor::new(
                ValueKind::Object,
                ExampleValue::literal(object([
                    ("type", FieldValue::from("basal")),
                    ("deliveryType", FieldValue::from("scheduled")),
                ])),
            )
            .requirements(ContextRequirements::new(Optional, NA, NA))
            .describe("Preceding basal event; linkage only, never serialized"),
        )
}

fn scheduled() -> SchemaFragment {
    SchemaFragment::new("basal-scheduled")
        .field(
            "rate",
            FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(0.0, 5.0, 3))
                .numeric(rate_contract()),
        )
        .field(
            "scheduleName",
            FieldDescriptor::new(
                ValueKind::String,
                ExampleValue::one_of(["Standard", "Weekday", "Weekend", "Pattern A"]),
            )
            .requirements(ContextRequirements::optional())
            .change(ChangeAnnotation::new(
                SchemaVersion::new(1, 1, 0),
                ChangeKind::MadeOptional,
            )),
        )
        .field(
            "expectedDuration",
            FieldDescriptor::not_applicable(ValueKind::Integer),
        )
}

fn temp() -> SchemaFragment {
    SchemaFragment::new("basal-temp")
        .field("duration", interrupted_duration())
        .field(
            "rate",
            FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(0.0, MAX_RATE, 3))
                .numeric(rate_contract()),
        )
        .field(
            "percent",
            FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(0.0, 1.0, 2))
                .numeric(NumericContract::float(Unit::Fraction).min(0.0).max(10.0))
                .optional()
                .describe("Multiplier of the suppressed scheduled rate")
                .change(
                    ChangeAnnotation::new(SchemaVersion::new(1, 3, 0), ChangeKind::RangeChanged)
                        .with_note("upper bound raised from 1 to 10"),
                ),
        )
        .field("suppressed", suppressed())
}

fn suspend() -> SchemaFragment {
    SchemaFragment::new("basal-suspend")
        .field("duration", interrupted_duration())
        .field("suppressed", suppressed())
}

/// Temp and suspend segments last 30 minutes to 12 hours.
fn interrupted_duration() -> FieldDescriptor {
    FieldDescriptor::new(
        ValueKind::Integer,
        ExampleValue::IntRange {
            min: 1_800_000,
            max: 43_200_000,
        },
    )
    .numeric(duration_contract())
}

fn suppressed() -> FieldDescriptor {
    FieldDescriptor::new(ValueKind::Object, ExampleValue::Derived)
        .describe("Scheduled delivery replaced by this event")
}

fn duration_contract() -> NumericContract {
    NumericContract::integer(Unit::Milliseconds)
        .min(0)
        .max(MAX_DURATION_MS)
}

fn rate_contract() -> NumericContract {
    NumericContract::float(Unit::UnitsPerHour).min(0.0).max(MAX_RATE)
}
