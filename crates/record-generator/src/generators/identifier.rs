//! Identifier generators (UUIDs and hex ids).

use rand::Rng;
use uuid::Uuid;

const HEX_DIGITS: &[u8] = b"0123456789abcdef";

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    // Generate 16 random bytes
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40; // Version 4
    bytes[8] = (bytes[8] & 0x3f) | 0x80; // Variant RFC 4122

    Uuid::from_bytes(bytes)
}

/// Generate a lowercase hex string of `length` characters.
pub fn generate_hex_id<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())] as char)
        .collect()
}
