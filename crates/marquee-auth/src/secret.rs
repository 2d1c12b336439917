//! Opaque one-time tokens (email verification, password reset).
//!
//! The raw token goes to the user; only its SHA-256 digest is stored.

use rand::RngExt;
use sha2::{Digest, Sha256};

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const HEX: &[u8] = b"0123456789abcdef";

fn random_from(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// Random alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
    random_from(ALPHANUMERIC, len)
}

/// Random lowercase hex string of `len` characters.
pub fn random_hex(len: usize) -> String {
    random_from(HEX, len)
}

/// Lowercase hex SHA-256 digest of `input`.
pub fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
