//! Short content fingerprints used for equality checks.
//!
//! A fingerprint is the first [`FINGERPRINT_LEN`] hex characters of the
//! SHA-256 digest of a string. It is only ever compared against another
//! fingerprint computed in the same run, never stored. Two different inputs
//! can collide at this width; a collision would be reported as a match.

use std::fmt;

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Truncated hex digest of some content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The hex characters of this fingerprint.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of `content`.
pub fn fingerprint(content: &str) -> Fingerprint {
    let mut hex = format!("{:x}", Sha256::digest(content.as_bytes()));
    hex.truncate(FINGERPRINT_LEN);
    Fingerprint(hex)
}
