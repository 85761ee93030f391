//! Hashing utilities.

use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_bytes(s.as_bytes())
}

/// First 16 hex characters of the SHA256 of a string, for directory names.
pub fn short_hash(s: &str) -> String {
    let mut hash = sha256_str(s);
    hash.truncate(16);
    hash
}
