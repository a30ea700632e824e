//! Fields every record carries regardless of its type.

use model_core::{
    ChangeAnnotation, ChangeKind, ContextRequirements, ExampleValue, FieldDescriptor, FieldValue,
    NumericContract, SchemaFragment, SchemaVersion, TimeField, Unit, ValueKind,
};
use model_core::Requirement::{NotApplicable as NA, Optional, Required};

use crate::object;

/// Assigned by the platform on upload; absent from device payloads.
const PLATFORM: ContextRequirements = ContextRequirements::new(NA, Required, Required);

/// Internal bookkeeping, never exposed to clients.
const STORAGE_ONLY: ContextRequirements = ContextRequirements::new(NA, Required, NA);

pub fn envelope() -> SchemaFragment {
    SchemaFragment::new("envelope")
        .field(
            "time",
            FieldDescriptor::new(ValueKind::Timestamp, ExampleValue::time(TimeField::Utc))
                .describe("UTC time of the event, RFC 3339 with milliseconds"),
        )
        .field(
            "timezoneOffset",
            FieldDescriptor::new(
                ValueKind::Integer,
                ExampleValue::time(TimeField::TimezoneOffset),
            )
            .numeric(NumericContract::integer(Unit::Minutes).min(-840).max(840))
            .requirements(ContextRequirements::new(Optional, Required, Required))
            .change(ChangeAnnotation::new(
                SchemaVersion::new(1, 1, 0),
                ChangeKind::MadeOptional,
            )
            .with_note("optional on ingestion; computed during upload")),
        )
        .field(
            "deviceTime",
            FieldDescriptor::new(
                ValueKind::LocalTimestamp,
                ExampleValue::time(TimeField::DeviceLocal),
            )
            .describe("Device wall-clock time without zone"),
        )
        .field(
            "deviceId",
            FieldDescriptor::new(
                ValueKind::String,
                ExampleValue::Pattern {
                    pattern: "DevId{rand:7}".to_string(),
                },
            ),
        )
        .field(
            "uploadId",
            FieldDescriptor::new(ValueKind::String, ExampleValue::HexId { length: 32 })
                .requirements(PLATFORM),
        )
        .field(
            "id",
            FieldDescriptor::new(ValueKind::String, ExampleValue::HexId { length: 32 })
                .requirements(PLATFORM),
        )
        .field(
            "guid",
            FieldDescriptor::new(ValueKind::String, ExampleValue::Uuid).requirements(STORAGE_ONLY),
        )
        .field(
            "_groupId",
            FieldDescriptor::new(ValueKind::String, ExampleValue::HexId { length: 10 })
                .requirements(STORAGE_ONLY),
        )
        .field(
            "createdTime",
            FieldDescriptor::new(
                ValueKind::Timestamp,
                ExampleValue::time(TimeField::CreatedTime),
            )
            .requirements(PLATFORM)
            .change(ChangeAnnotation::new(
                SchemaVersion::new(1, 2, 0),
                ChangeKind::Added,
            )),
        )
        .field(
            "_schemaVersion",
            FieldDescriptor::new(ValueKind::Integer, ExampleValue::literal(3_i64))
                .numeric(NumericContract::integer(Unit::None).min(0))
                .requirements(STORAGE_ONLY),
        )
        .field(
            "conversionOffset",
            FieldDescriptor::new(
                ValueKind::Integer,
                ExampleValue::time(TimeField::ConversionOffset),
            )
            .numeric(NumericContract::integer(Unit::Milliseconds))
            .requirements(ContextRequirements::new(Optional, Required, Required)),
        )
        .field(
            "clockDriftOffset",
            FieldDescriptor::new(
                ValueKind::Integer,
                ExampleValue::IntRange {
                    min: -120_000,
                    max: 120_000,
                },
            )
            .numeric(NumericContract::integer(Unit::Milliseconds))
            .optional()
            .change(ChangeAnnotation::new(
                SchemaVersion::new(1, 3, 0),
                ChangeKind::Added,
            )),
        )
        .field(
            "annotations",
            FieldDescriptor::new(
                ValueKind::Array,
                ExampleValue::literal(FieldValue::Array(vec![annotation(
                    "basal/mismatched-series",
                )])),
            )
            .optional(),
        )
        .field(
            "payload",
            FieldDescriptor::new(
                ValueKind::Object,
                ExampleValue::literal(object([(
                    "logIndices",
                    FieldValue::Array(vec![FieldValue::Int(2517)]),
                )])),
            )
            .optional()
            .describe("Device-specific data carried through unchanged"),
        )
}

fn annotation(code: &str) -> FieldValue {
    object([("code", FieldValue::from(code))])
}
