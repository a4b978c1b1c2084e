//! Hashing utilities for project GUIDs.

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

/// Derive a GUID-shaped token (`8-4-4-4-12`, uppercase hex) from a name.
///
/// The same name always yields the same token, so regenerating a tree
/// keeps cross-references between descriptors stable.
pub fn guid(name: &str) -> String {
    let hash = sha256_str(name).to_uppercase();
    format!(
        "{}-{}-{}-{}-{}",
        &hash[0..8],
        &hash[8..12],
        &hash[12..16],
        &hash[16..20],
        &hash[20..32]
    )
}
