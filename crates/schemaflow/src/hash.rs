//! Content hashing for statement and file identity.
//!
//! Identity throughout the registry and ledger is a SHA-256 hex digest of
//! canonical text. Hash equality is treated as statement identity; full text
//! equality is never re-verified beyond the hash.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Compute the hex digest of a string.
pub fn hash_str(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compute the hex digest of a file's contents.
pub fn hash_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_str(&content))
}
