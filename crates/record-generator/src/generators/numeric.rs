//! Numeric value generators.

use model_core::FieldValue;
use rand::Rng;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> FieldValue {
    if min >= max {
        return FieldValue::Int(min);
    }
    FieldValue::Int(rng.random_range(min..=max))
}

/// Generate a random float in the given range (inclusive).
///
/// With `decimals`, the value is rounded to that many places and clamped
/// back into the range.
pub fn generate_float_range<R: Rng>(
    rng: &mut R,
    min: f64,
    max: f64,
    decimals: Option<u32>,
) -> FieldValue {
    if min >= max {
        return FieldValue::Float(min);
    }
    let value = rng.random_range(min..=max);
    match decimals {
        Some(places) => FieldValue::Float(round_to(value, places).clamp(min, max)),
        None => FieldValue::Float(value),
    }
}

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_int_range() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = generate_int_range(&mut rng, 10, 20);
            if let FieldValue::Int(v) = value {
                assert!((10..=20).contains(&v));
            } else {
                panic!("Expected Int value");
            }
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(generate_int_range(&mut rng, 5, 5), FieldValue::Int(5));
        assert_eq!(
            generate_float_range(&mut rng, 1.5, 1.5, None),
            FieldValue::Float(1.5)
        );
    }

    #[test]
    fn test_generate_float_range_with_decimals() {
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let value = generate_float_range(&mut rng, 0.0, 1.0, Some(2));
            if let FieldValue::Float(v) = value {
                assert!((0.0..=1.0).contains(&v));
                assert!((v * 100.0 - (v * 100.0).round()).abs() < 1e-9);
            } else {
                panic!("Expected Float value");
            }
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.995, 0), 1.0);
    }
}
