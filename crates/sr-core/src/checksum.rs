//! SHA-256 checksum utility for script fingerprints.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 of a byte slice
pub fn compute_checksum(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    format!("{:x}", hasher.finalize())
}
