//! SHA-256 checksum utility for detecting migrations edited after apply.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of a migration body.
///
/// Line endings are normalized to `\n` first so the same file checked out on
/// Windows and Unix produces the same checksum.
pub fn compute_checksum(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.replace("\r\n", "\n").as_bytes());
    format!("{:x}", hasher.finalize())
}
