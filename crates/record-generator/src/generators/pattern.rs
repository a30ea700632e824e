//! Pattern-based string generator.
//!
//! Supports placeholders:
//! - `{uuid}` - random UUID
//! - `{rand:N}` - random N-digit number
//! - `{hex:N}` - random N-character hex string

use crate::generators::identifier::{generate_hex_id, generate_uuid_v4};
use rand::Rng;

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern<R: Rng>(pattern: &str, rng: &mut R) -> String {
    let mut result = pattern.to_string();

    while result.contains("{uuid}") {
        let uuid = generate_uuid_v4(rng).to_string();
        result = result.replacen("{uuid}", &uuid, 1);
    }

    result = replace_counted(result, "{rand:", |n| generate_random_digits(rng, n));
    result = replace_counted(result, "{hex:", |n| generate_hex_id(rng, n));

    result
}

/// Replace every `{prefix N}` placeholder with `produce(N)`.
fn replace_counted(mut result: String, prefix: &str, mut produce: impl FnMut(usize) -> String) -> String {
    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find(prefix) {
        let start = search_from + offset;
        let Some(end) = result[start..].find('}').map(|e| start + e) else {
            break;
        };
        match result[start + prefix.len()..end].parse::<usize>() {
            Ok(count) => {
                let value = produce(count);
                result = format!("{}{}{}", &result[..start], value, &result[end + 1..]);
                search_from = start + value.len();
            }
            // Invalid format, leave it in place
            Err(_) => search_from = end + 1,
        }
    }
    result
}

/// Generate a random number with exactly N digits.
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);
    for i in 0..digits {
        // First digit 1-9 to avoid leading zeros
        let digit = if i == 0 {
            rng.random_range(1..10u8)
        } else {
            rng.random_range(0..10u8)
        };
        result.push(char::from(b'0' + digit));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rand_placeholder() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("MMT-{rand:6}", &mut rng);
        assert!(value.starts_with("MMT-"));
        assert_eq!(value.len(), 10);
        assert!(value[4..].chars().all(|c| c.is_ascii_digit()));
        assert_ne!(&value[4..5], "0");
    }

    #[test]
    fn test_hex_and_uuid_placeholders() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("upid_{hex:8}/{uuid}", &mut rng);
        let (left, right) = value.split_once('/').unwrap();
        assert_eq!(left.len(), "upid_".len() + 8);
        assert_eq!(right.len(), 36);
    }

    #[test]
    fn test_invalid_placeholder_left_alone() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(generate_pattern("{rand:x} {rand:2", &mut rng), "{rand:x} {rand:2");
    }

    #[test]
    fn test_pattern_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(1);
        let mut rng2 = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_pattern("{rand:4}-{hex:4}", &mut rng1),
            generate_pattern("{rand:4}-{hex:4}", &mut rng2)
        );
    }
}
