//! Variant post-processing steps.
//!
//! Run by the generator strictly after the schema walk, in this order:
//! removals, nested sub-record (driven by the generator itself, since it
//! recurses), product derivations, multiple derivations.

use model_core::{
    EffectiveSchema, FieldValue, MultipleDerivation, NumericalType, ProductDerivation,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Drop fields the variant declares not applicable.
pub fn remove_fields(fields: &mut BTreeMap<String, FieldValue>, remove: &[String]) {
    for name in remove {
        fields.remove(name);
    }
}

/// Look up a dotted path (`suppressed.rate`) in a field map.
pub fn lookup<'a>(fields: &'a BTreeMap<String, FieldValue>, path: &str) -> Option<&'a FieldValue> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Apply `target = factor * source` derivations.
///
/// Skipped when the factor is absent, so the directly generated target
/// stays. When the source cannot be resolved the factor is removed and the
/// target keeps its generated value.
pub fn apply_products(
    schema: &EffectiveSchema,
    fields: &mut BTreeMap<String, FieldValue>,
    products: &[ProductDerivation],
) {
    for product in products {
        let Some(factor) = fields.get(&product.factor).and_then(FieldValue::as_f64) else {
            continue;
        };
        let Some(source) = lookup(fields, &product.source).and_then(FieldValue::as_f64) else {
            debug!(
                "Dropping {}: {} is absent, {} keeps its generated value",
                product.factor, product.source, product.target
            );
            fields.remove(&product.factor);
            continue;
        };
        let value = numeric_value(schema, &product.target, factor * source);
        debug!(
            "Derived {} = {} * {} = {}",
            product.target, product.factor, product.source, value
        );
        fields.insert(product.target.clone(), value);
    }
}

/// Apply `target = multiplier * source` derivations.
///
/// A target whose source is absent is absent too.
pub fn apply_multiples(
    schema: &EffectiveSchema,
    fields: &mut BTreeMap<String, FieldValue>,
    multiples: &[MultipleDerivation],
) {
    for multiple in multiples {
        match lookup(fields, &multiple.source).and_then(FieldValue::as_f64) {
            Some(source) => {
                let value = numeric_value(schema, &multiple.target, source * multiple.multiplier);
                fields.insert(multiple.target.clone(), value);
            }
            None => {
                fields.remove(&multiple.target);
            }
        }
    }
}

/// Shape a derived number after the target's declared numerical type.
///
/// Integer targets are rounded and clamped to the `i64` range. A value
/// outside the target's contract is kept and logged.
fn numeric_value(schema: &EffectiveSchema, target: &str, value: f64) -> FieldValue {
    let numeric = schema.get_field(target).and_then(|d| d.contract.numeric.as_ref());
    let shaped = match numeric {
        Some(n) if n.numerical_type == NumericalType::Integer => {
            let rounded = value.round();
            let clamped = rounded.clamp(i64::MIN as f64, i64::MAX as f64);
            if clamped != rounded {
                debug!("Derived {target} = {value} exceeds the integer range, clamping");
            }
            // NaN maps to 0
            FieldValue::Int(clamped as i64)
        }
        _ => FieldValue::Float(value),
    };
    if let Some(reason) = numeric.and_then(|n| n.check(&shaped, None).err()) {
        debug!("Derived {target} = {shaped} is outside {reason}");
    }
    shaped
}
