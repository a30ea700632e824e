//! Individual value generators for different example-value kinds.
//!
//! This module provides the generation logic for each [`ExampleValue`]
//! variant declared by a field descriptor.

pub mod identifier;
pub mod numeric;
pub mod pattern;
pub mod timestamp;

use crate::generator::GenerationContext;
use model_core::{ExampleValue, FieldValue};
use rand::Rng;

/// Generate a value for an example-value description.
///
/// `Derived` values are produced by post-processing, so they yield `Null`
/// here; the schema walk never calls this for them.
pub fn generate_value<R: Rng>(
    example: &ExampleValue,
    rng: &mut R,
    ctx: &GenerationContext,
) -> FieldValue {
    match example {
        ExampleValue::Literal { value } => value.clone(),

        ExampleValue::IntRange { min, max } => numeric::generate_int_range(rng, *min, *max),

        ExampleValue::FloatRange { min, max, decimals } => {
            numeric::generate_float_range(rng, *min, *max, *decimals)
        }

        ExampleValue::OneOf { values } => {
            if values.is_empty() {
                FieldValue::Null
            } else {
                let idx = rng.random_range(0..values.len());
                values[idx].clone()
            }
        }

        ExampleValue::WeightedBool { true_weight } => {
            FieldValue::Bool(rng.random_bool(true_weight.clamp(0.0, 1.0)))
        }

        ExampleValue::Uuid => FieldValue::String(identifier::generate_uuid_v4(rng).to_string()),

        ExampleValue::HexId { length } => {
            FieldValue::String(identifier::generate_hex_id(rng, *length))
        }

        ExampleValue::Pattern { pattern } => {
            FieldValue::String(pattern::generate_pattern(pattern, rng))
        }

        ExampleValue::Time { field } => timestamp::generate_time_field(*field, rng, ctx),

        ExampleValue::Derived => FieldValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_core::Context;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ctx() -> GenerationContext {
        GenerationContext {
            timestamp: timestamp::parse_timestamp("2016-05-04T08:18:06.425Z").unwrap(),
            context: Context::Storage,
            timezone_offset: 0,
        }
    }

    #[test]
    fn test_literal_and_one_of() {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = ctx();

        assert_eq!(
            generate_value(&ExampleValue::literal("basal"), &mut rng, &ctx),
            FieldValue::from("basal")
        );

        let pool = ExampleValue::one_of(["Standard", "Weekend"]);
        for _ in 0..20 {
            let value = generate_value(&pool, &mut rng, &ctx);
            assert!(matches!(value.as_str(), Some("Standard" | "Weekend")));
        }

        assert_eq!(
            generate_value(&ExampleValue::OneOf { values: vec![] }, &mut rng, &ctx),
            FieldValue::Null
        );
    }

    #[test]
    fn test_deferred_values_vary() {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = ctx();
        let example = ExampleValue::IntRange {
            min: 0,
            max: 1_000_000,
        };

        let values: Vec<_> = (0..10)
            .map(|_| generate_value(&example, &mut rng, &ctx))
            .collect();
        assert!(values.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_weighted_bool_extremes() {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = ctx();
        let always = ExampleValue::WeightedBool { true_weight: 1.0 };
        let never = ExampleValue::WeightedBool { true_weight: -3.0 };
        for _ in 0..10 {
            assert_eq!(generate_value(&always, &mut rng, &ctx), FieldValue::Bool(true));
            assert_eq!(generate_value(&never, &mut rng, &ctx), FieldValue::Bool(false));
        }
    }

    #[test]
    fn test_derived_yields_null() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(generate_value(&ExampleValue::Derived, &mut rng, &ctx()).is_null());
    }
}
