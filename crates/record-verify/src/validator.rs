//! Exhaustive contract validation of record instances.
//!
//! Validation never stops at the first problem: every field of the effective
//! schema and every field of the record is checked, and all violations land
//! in one [`ValidationReport`].

use crate::error::VerifyError;
use crate::report::{ValidationReport, Violation};
use model_core::{
    Context, EffectiveSchema, FieldContract, FieldValue, Record, Requirement, ValueKind,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Validate `record` against `schema` for `context`.
pub fn validate(schema: &EffectiveSchema, record: &Record, context: Context) -> ValidationReport {
    let mut report = ValidationReport::new(&schema.record_type, &schema.variant, context);
    let contracts: BTreeMap<&str, &FieldContract> = schema
        .fields
        .iter()
        .map(|(name, d)| (name.as_str(), &d.contract))
        .collect();

    check_fields(
        &contracts,
        &schema.post.remove,
        &record.fields,
        record,
        context,
        "",
        &mut report,
    );

    debug!(
        "Validated {}/{} for {}: {} violation(s)",
        schema.record_type,
        schema.variant,
        context,
        report.violations().len()
    );
    report
}

/// Parse a JSON object into a [`Record`] of `schema`'s record type and
/// validate it.
pub fn validate_json(
    schema: &EffectiveSchema,
    value: serde_json::Value,
    context: Context,
) -> Result<ValidationReport, VerifyError> {
    let record = record_from_json(schema, value, context)?;
    Ok(validate(schema, &record, context))
}

/// Build a [`Record`] from a JSON object.
pub fn record_from_json(
    schema: &EffectiveSchema,
    value: serde_json::Value,
    context: Context,
) -> Result<Record, VerifyError> {
    if !value.is_object() {
        return Err(VerifyError::NotAnObject(json_kind(&value).to_string()));
    }
    let fields: BTreeMap<String, FieldValue> = serde_json::from_value(value)?;
    Ok(Record::new(
        schema.record_type.clone(),
        schema.variant.clone(),
        Some(context),
        fields,
    ))
}

/// Fields listed in `removed` are never serialized by their variant and are
/// not applicable in every context.
fn check_fields(
    contracts: &BTreeMap<&str, &FieldContract>,
    removed: &[String],
    fields: &BTreeMap<String, FieldValue>,
    scope: &Record,
    context: Context,
    prefix: &str,
    report: &mut ValidationReport,
) {
    for (name, contract) in contracts {
        let path = format!("{prefix}{name}");
        let requirement = if removed.iter().any(|r| r == name) {
            Requirement::NotApplicable
        } else {
            contract.requirement(context)
        };
        match (requirement, fields.get(*name)) {
            (Requirement::Required, None) => {
                report.push(Violation::MissingRequiredField {
                    field: path,
                    context,
                });
            }
            (Requirement::NotApplicable, Some(_)) => {
                report.push(Violation::NotApplicable {
                    field: path,
                    context,
                });
            }
            (_, Some(value)) => check_value(contract, value, scope, context, &path, report),
            (_, None) => {}
        }
    }

    for name in fields.keys() {
        if !contracts.contains_key(name.as_str()) {
            report.push(Violation::UnknownField {
                field: format!("{prefix}{name}"),
            });
        }
    }
}

fn check_value(
    contract: &FieldContract,
    value: &FieldValue,
    scope: &Record,
    context: Context,
    path: &str,
    report: &mut ValidationReport,
) {
    let violation = |expected: String| Violation::ConstraintViolation {
        field: path.to_string(),
        value: value.clone(),
        expected,
    };

    if !contract.kind.accepts(value) {
        report.push(violation(format!("{} {}", article(contract.kind), contract.kind)));
        return;
    }

    if let Some(allowed) = &contract.allowed {
        if !allowed.contains(value) {
            let choices: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            report.push(violation(format!("one of [{}]", choices.join(", "))));
        }
    }

    if let Some(numeric) = &contract.numeric {
        if let Err(expected) = numeric.check(value, Some(scope)) {
            report.push(violation(expected));
        }
    }

    if let (Some(nested), Some(object)) = (&contract.nested, value.as_object()) {
        let contracts: BTreeMap<&str, &FieldContract> = nested
            .fields
            .iter()
            .map(|(name, c)| (name.as_str(), c))
            .collect();
        // Symbolic bounds inside the sub-record refer to its own fields
        let sub_scope = Record::new(
            scope.record_type.clone(),
            scope.variant.clone(),
            Some(context),
            object.clone(),
        );
        check_fields(
            &contracts,
            &[],
            object,
            &sub_scope,
            context,
            &format!("{path}."),
            report,
        );
    }
}

fn article(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Integer | ValueKind::Object | ValueKind::Array | ValueKind::Any => "an",
        _ => "a",
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_core::{
        ContextRequirements, ExampleValue, FieldDescriptor, FragmentLibrary, NumericContract,
        PostProcessing, RecordType, SchemaFragment, Unit, VariantDefinition,
    };
    use serde_json::json;

    fn basal() -> RecordType {
        RecordType::new("basal", "deliveryType")
            .base(
                SchemaFragment::new("basal")
                    .field(
                        "type",
                        FieldDescriptor::new(ValueKind::String, ExampleValue::literal("basal"))
                            .allowed(["basal"]),
                    )
                    .field(
                        "duration",
                        FieldDescriptor::new(ValueKind::Integer, ExampleValue::Derived).numeric(
                            NumericContract::integer(Unit::Milliseconds)
                                .min(0)
                                .max(86_400_000),
                        ),
                    )
                    .field(
                        "expectedDuration",
                        FieldDescriptor::new(ValueKind::Integer, ExampleValue::Derived)
                            .numeric(NumericContract::integer(Unit::Milliseconds).min("duration"))
                            .optional(),
                    )
                    .field(
                        "id",
                        FieldDescriptor::new(ValueKind::String, ExampleValue::Derived)
                            .requirements(ContextRequirements::new(
                                Requirement::NotApplicable,
                                Requirement::Required,
                                Requirement::Required,
                            )),
                    ),
            )
            .variant(
                "scheduled",
                VariantDefinition::new(SchemaFragment::new("scheduled").field(
                    "rate",
                    FieldDescriptor::new(ValueKind::Float, ExampleValue::Derived)
                        .numeric(NumericContract::float(Unit::UnitsPerHour).min(0.0).max(20.0)),
                )),
            )
            .variant(
                "temp",
                VariantDefinition::new(
                    SchemaFragment::new("temp").field(
                        "suppressed",
                        FieldDescriptor::new(ValueKind::Object, ExampleValue::Derived).optional(),
                    ),
                )
                .with_post(PostProcessing::default().nested(
                    "suppressed",
                    "scheduled",
                    ["type", "deliveryType", "rate"],
                )),
            )
    }

    fn schema(variant: &str) -> EffectiveSchema {
        basal()
            .effective_schema(&FragmentLibrary::default(), variant)
            .unwrap()
    }

    #[test]
    fn test_valid_record() {
        let report = validate_json(
            &schema("scheduled"),
            json!({"type": "basal", "deliveryType": "scheduled", "duration": 3600000, "rate": 1.25}),
            Context::Ingestion,
        )
        .unwrap();
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_collects_every_violation() {
        let report = validate_json(
            &schema("scheduled"),
            json!({
                "type": "bolus",
                "deliveryType": "scheduled",
                "duration": 1.5,
                "rate": 25.0,
                "id": "abc",
                "extra": true
            }),
            Context::Ingestion,
        )
        .unwrap();

        let fields: Vec<_> = report.violations().iter().map(Violation::field).collect();
        assert_eq!(fields, vec!["duration", "id", "rate", "type", "extra"]);
        assert!(matches!(
            report.violations()[1],
            Violation::NotApplicable { context: Context::Ingestion, .. }
        ));
        assert!(matches!(report.violations()[4], Violation::UnknownField { .. }));
    }

    #[test]
    fn test_missing_required_per_context() {
        let record = json!({"type": "basal", "deliveryType": "scheduled", "duration": 0, "rate": 0});

        let ingestion = validate_json(&schema("scheduled"), record.clone(), Context::Ingestion).unwrap();
        assert!(ingestion.is_valid());

        let storage = validate_json(&schema("scheduled"), record, Context::Storage).unwrap();
        assert_eq!(
            storage.violations(),
            &[Violation::MissingRequiredField {
                field: "id".into(),
                context: Context::Storage
            }]
        );
    }

    #[test]
    fn test_symbolic_bound_enforced_when_resolvable() {
        let report = validate_json(
            &schema("scheduled"),
            json!({
                "type": "basal",
                "deliveryType": "scheduled",
                "duration": 3600000,
                "expectedDuration": 1800000,
                "rate": 1.0
            }),
            Context::Client,
        )
        .unwrap();
        // id missing, expectedDuration below duration
        let fields: Vec<_> = report.violations().iter().map(Violation::field).collect();
        assert_eq!(fields, vec!["expectedDuration", "id"]);
    }

    #[test]
    fn test_nested_violations_use_dotted_paths() {
        let report = validate_json(
            &schema("temp"),
            json!({
                "type": "basal",
                "deliveryType": "temp",
                "duration": 3600000,
                "suppressed": {
                    "type": "basal",
                    "deliveryType": "weekly",
                    "rate": 30.0,
                    "scheduleName": "Standard"
                }
            }),
            Context::Ingestion,
        )
        .unwrap();

        let fields: Vec<_> = report.violations().iter().map(Violation::field).collect();
        assert_eq!(
            fields,
            vec![
                "suppressed.deliveryType",
                "suppressed.rate",
                "suppressed.scheduleName"
            ]
        );
    }

    #[test]
    fn test_removed_field_is_not_applicable() {
        let schema = RecordType::new("basal", "deliveryType")
            .base(
                SchemaFragment::new("basal")
                    .field(
                        "type",
                        FieldDescriptor::new(ValueKind::String, ExampleValue::literal("basal")),
                    )
                    .field(
                        "previous",
                        FieldDescriptor::new(ValueKind::Object, ExampleValue::Derived).optional(),
                    ),
            )
            .variant(
                "scheduled",
                VariantDefinition::new(SchemaFragment::new("scheduled"))
                    .with_post(PostProcessing::default().remove("previous")),
            )
            .effective_schema(&FragmentLibrary::default(), "scheduled")
            .unwrap();

        let record = json!({
            "type": "basal",
            "deliveryType": "scheduled",
            "previous": {"type": "basal", "deliveryType": "scheduled"}
        });
        for context in Context::ALL {
            let report = validate_json(&schema, record.clone(), context).unwrap();
            assert_eq!(
                report.violations(),
                &[Violation::NotApplicable {
                    field: "previous".into(),
                    context
                }]
            );
        }

        let without = json!({"type": "basal", "deliveryType": "scheduled"});
        assert!(validate_json(&schema, without, Context::Ingestion)
            .unwrap()
            .is_valid());
    }

    #[test]
    fn test_wrong_kind_reports_once() {
        let report = validate_json(
            &schema("scheduled"),
            json!({"type": "basal", "deliveryType": "scheduled", "duration": "long", "rate": 1}),
            Context::Ingestion,
        )
        .unwrap();
        assert_eq!(
            report.violations(),
            &[Violation::ConstraintViolation {
                field: "duration".into(),
                value: FieldValue::from("long"),
                expected: "an integer".into(),
            }]
        );
    }

    #[test]
    fn test_not_an_object() {
        let result = validate_json(&schema("scheduled"), json!([1, 2]), Context::Ingestion);
        assert!(matches!(result, Err(VerifyError::NotAnObject(kind)) if kind == "an array"));
    }
}
