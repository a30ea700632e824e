//! Batch verifier for JSON Lines record streams.

use crate::error::VerifyError;
use crate::report::{BatchReport, LineFailure, ValidationReport};
use crate::validator::validate_json;
use model_core::{Catalog, Context, EffectiveSchema, SchemaError};
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, info, warn};

/// Resolves a record type and variant into the schema records are checked
/// against.
pub trait SchemaResolver {
    fn resolve(&self, record_type: &str, variant: &str) -> Result<EffectiveSchema, SchemaError>;
}

impl SchemaResolver for Catalog {
    fn resolve(&self, record_type: &str, variant: &str) -> Result<EffectiveSchema, SchemaError> {
        self.effective_schema(record_type, variant)
    }
}

/// Verifier that picks each record's schema from its `type` and
/// discriminant fields.
pub struct BatchVerifier<'a, S: SchemaResolver> {
    resolver: &'a S,
    catalog: &'a Catalog,
    context: Context,
    /// Resolved schemas keyed by (record type, variant)
    schemas: BTreeMap<(String, String), EffectiveSchema>,
}

impl<'a> BatchVerifier<'a, Catalog> {
    /// Verifier resolving schemas straight from `catalog`.
    pub fn new(catalog: &'a Catalog, context: Context) -> Self {
        Self::with_resolver(catalog, catalog, context)
    }
}

impl<'a, S: SchemaResolver> BatchVerifier<'a, S> {
    /// Verifier resolving schemas through `resolver`; `catalog` supplies the
    /// discriminant field of each record type.
    pub fn with_resolver(resolver: &'a S, catalog: &'a Catalog, context: Context) -> Self {
        Self {
            resolver,
            catalog,
            context,
            schemas: BTreeMap::new(),
        }
    }

    /// Validate one JSON record.
    pub fn verify_value(&mut self, value: serde_json::Value) -> Result<ValidationReport, VerifyError> {
        let (record_type, variant) = self.select(&value)?;
        let key = (record_type, variant);
        if !self.schemas.contains_key(&key) {
            let schema = self.resolver.resolve(&key.0, &key.1)?;
            debug!("Resolved schema for {}/{}", key.0, key.1);
            self.schemas.insert(key.clone(), schema);
        }
        let schema = &self.schemas[&key];
        validate_json(schema, value, self.context)
    }

    /// Validate every non-empty line of `reader`.
    pub fn verify_reader<R: BufRead>(&mut self, reader: R) -> Result<BatchReport, VerifyError> {
        let mut report = BatchReport::default();
        info!("Starting validation for context '{}'", self.context);

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let number = idx as u64 + 1;
            report.total += 1;

            let outcome = serde_json::from_str(&line)
                .map_err(VerifyError::from)
                .and_then(|value| self.verify_value(value));
            match outcome {
                Ok(validation) if validation.is_valid() => report.valid += 1,
                Ok(validation) => {
                    warn!(
                        "Line {number}: {} violation(s) in {}/{}",
                        validation.violations().len(),
                        validation.record_type,
                        validation.variant
                    );
                    report.failures.push(LineFailure::Invalid {
                        line: number,
                        report: validation,
                    });
                }
                Err(error) => {
                    warn!("Line {number}: {error}");
                    report
                        .failures
                        .push(LineFailure::Unresolved { line: number, error });
                }
            }
        }

        info!("{}", report.summary());
        Ok(report)
    }

    /// Record type from `type`, variant from the type's discriminant field.
    fn select(&self, value: &serde_json::Value) -> Result<(String, String), VerifyError> {
        let Some(object) = value.as_object() else {
            return Err(VerifyError::NotAnObject(value.to_string()));
        };
        let record_type = object
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| VerifyError::MissingSelector("type".to_string()))?;
        let definition = self.catalog.record_type(record_type)?;

        let variant = match &definition.discriminant {
            Some(field) => object
                .get(field)
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| VerifyError::MissingSelector(field.clone()))?,
            None => record_type,
        };
        Ok((record_type.to_string(), variant.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_core::{
        ExampleValue, FieldDescriptor, FragmentLibrary, NumericContract, RecordType,
        SchemaFragment, Unit, ValueKind,
    };
    use std::io::Cursor;

    fn catalog() -> Catalog {
        Catalog::new(FragmentLibrary::default()).with(RecordType::single(
            "cbg",
            SchemaFragment::new("cbg")
                .field(
                    "type",
                    FieldDescriptor::new(ValueKind::String, ExampleValue::literal("cbg")),
                )
                .field(
                    "value",
                    FieldDescriptor::new(ValueKind::Float, ExampleValue::literal(5.5))
                        .numeric(NumericContract::float(Unit::MmolPerL).min(0.0).max(55.0)),
                ),
        ))
    }

    #[test]
    fn test_verify_reader() {
        let input = concat!(
            "{\"type\": \"cbg\", \"value\": 5.5}\n",
            "\n",
            "{\"type\": \"cbg\", \"value\": 60.0}\n",
            "{\"type\": \"smbg\", \"value\": 5.5}\n",
            "not json\n",
        );
        let catalog = catalog();
        let mut verifier = BatchVerifier::new(&catalog, Context::Ingestion);
        let report = verifier.verify_reader(Cursor::new(input)).unwrap();

        assert_eq!(report.total, 4);
        assert_eq!(report.valid, 1);
        assert_eq!(report.failures.len(), 3);
        assert!(matches!(report.failures[0], LineFailure::Invalid { line: 3, .. }));
        assert!(matches!(
            &report.failures[1],
            LineFailure::Unresolved {
                line: 4,
                error: VerifyError::Schema(SchemaError::UnknownRecordType(_))
            }
        ));
        assert!(matches!(
            &report.failures[2],
            LineFailure::Unresolved {
                line: 5,
                error: VerifyError::Json(_)
            }
        ));
    }

    #[test]
    fn test_missing_type_selector() {
        let catalog = catalog();
        let mut verifier = BatchVerifier::new(&catalog, Context::Storage);
        let result = verifier.verify_value(serde_json::json!({"value": 1.0}));
        assert!(matches!(result, Err(VerifyError::MissingSelector(field)) if field == "type"));
    }
}
