//! Blood glucose readings: continuous (`cbg`) and self-monitored (`smbg`).

use model_core::{
    ChangeAnnotation, ChangeKind, ExampleValue, FieldDescriptor, NumericContract, RecordType,
    SchemaFragment, SchemaVersion, Unit, ValueKind,
};

/// Name of the shared library fragment both glucose types compose.
pub const BLOOD_GLUCOSE: &str = "bloodGlucose";

/// Upper bound of a glucose value in mmol/L.
pub const MAX_MMOL_PER_L: f64 = 55.0;

/// Value and units shared by every glucose reading.
pub fn blood_glucose() -> SchemaFragment {
    SchemaFragment::new(BLOOD_GLUCOSE)
        .field(
            "value",
            FieldDescriptor::new(ValueKind::Float, ExampleValue::float_range(2.2, 22.2, 5))
                .numeric(
                    NumericContract::float(Unit::MmolPerL)
                        .min(0.0)
                        .max(MAX_MMOL_PER_L),
                )
                .describe("Glucose concentration, always stored in mmol/L")
                .change(
                    ChangeAnnotation::new(SchemaVersion::new(1, 0, 0), ChangeKind::RangeChanged)
                        .with_note("stored in mmol/L; mg/dL converted on upload"),
                ),
        )
        .field(
            "units",
            FieldDescriptor::new(ValueKind::String, ExampleValue::literal("mmol/L"))
                .allowed(["mmol/L"]),
        )
}

pub fn cbg() -> RecordType {
    RecordType::single("cbg", type_only("cbg")).shared(BLOOD_GLUCOSE)
}

pub fn smbg() -> RecordType {
    RecordType::single(
        "smbg",
        type_only("smbg").field(
            "subType",
            FieldDescriptor::new(ValueKind::String, ExampleValue::one_of(["manual", "linked"]))
                .allowed(["manual", "linked"])
                .optional()
                .change(ChangeAnnotation::new(
                    SchemaVersion::new(1, 3, 0),
                    ChangeKind::Added,
                )),
        ),
    )
    .shared(BLOOD_GLUCOSE)
}

fn type_only(name: &str) -> SchemaFragment {
    SchemaFragment::new(name).field(
        "type",
        FieldDescriptor::new(ValueKind::String, ExampleValue::literal(name)).allowed([name]),
    )
}
