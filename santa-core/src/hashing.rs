//! Hashing - SHA-256 Digests of Rendered Documents
//!
//! Rendering is deterministic, so a digest identifies a certificate's exact
//! bytes and makes golden checks trivial.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
