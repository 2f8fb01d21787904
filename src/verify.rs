//! # Patch Integrity Verification
//!
//! Every patch in a manifest is pinned by the SHA-1 of its exact bytes. This
//! module computes that digest and compares it with the pinned value. The
//! comparison is byte-for-byte and case-sensitive, and the file is hashed as
//! stored: no line-ending normalization and no partial reads.
//!
//! A mismatch is an ordinary `false` from [`verify`]. Failing to read the file
//! is an `Error::PatchRead`, so callers can tell the two apart.

use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Lowercase hex SHA-1 of `bytes`.
pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Reads the whole file at `patch_path` and returns its lowercase hex SHA-1.
pub fn compute_hash(patch_path: &Path) -> Result<String> {
    let bytes = std::fs::read(patch_path).map_err(|source| Error::PatchRead {
        path: patch_path.to_path_buf(),
        source,
    })?;
    Ok(digest_hex(&bytes))
}

/// Returns true iff the SHA-1 of the file at `patch_path` equals `expected_hash`.
pub fn verify(patch_path: &Path, expected_hash: &str) -> Result<bool> {
    Ok(compute_hash(patch_path)? == expected_hash)
}

/// Like [`verify`], but turns a mismatch into `Error::Integrity` carrying
/// both digests.
pub fn ensure_verified(patch_path: &Path, expected_hash: &str) -> Result<()> {
    let computed = compute_hash(patch_path)?;
    if computed != expected_hash {
        return Err(Error::Integrity {
            path: patch_path.to_path_buf(),
            expected: expected_hash.to_string(),
            computed,
        });
    }
    Ok(())
}
