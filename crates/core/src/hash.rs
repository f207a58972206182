//! SHA-1 signatures for scan configurations
//!
//! A signature identifies the *shape* of a scan (roots, ignore globs, toggles,
//! platform). Two configurations that only differ in ordering or duplicates
//! hash to the same value, so the result cache survives reordering of the
//! user's settings.

use crate::platform::Platform;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;

/// Version of the cache schema, mixed into every signature
pub const SCHEMA_VERSION: u32 = 1;

/// A SHA-1 digest of a canonicalized scan configuration (20 bytes)
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ScanSignature([u8; 20]);

impl ScanSignature {
    /// Create a signature from raw digest bytes
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the digest as a byte slice
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Convert to lowercase hex string (40 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != 40 {
            anyhow::bail!(
                "Invalid signature length: expected 40 characters, got {}",
                hex_str.len()
            );
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Compute the signature of a scan configuration
    ///
    /// Roots and ignore globs are projected into sorted sets before hashing.
    pub fn compute(input: &SignatureInput<'_>) -> Self {
        let canonical = CanonicalInput {
            v: SCHEMA_VERSION,
            platform: input.platform.as_str(),
            roots: input.roots.iter().map(String::as_str).collect(),
            ignore_globs: input.ignore_globs.iter().map(String::as_str).collect(),
            respect_nested_ignore: input.respect_nested_ignore,
            stop_at_marker: input.stop_at_marker,
        };

        // Serializing plain strings, sets and booleans cannot fail
        let json = serde_json::to_vec(&canonical).unwrap_or_default();

        let mut hasher = Sha1::new();
        hasher.update(&json);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }
}

impl std::fmt::Debug for ScanSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ScanSignature({})", self.to_hex())
    }
}

impl std::fmt::Display for ScanSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<ScanSignature> for String {
    fn from(sig: ScanSignature) -> Self {
        sig.to_hex()
    }
}

impl TryFrom<String> for ScanSignature {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

/// Everything that determines what a scan can find
#[derive(Debug, Clone)]
pub struct SignatureInput<'a> {
    pub platform: &'a Platform,
    pub roots: &'a [String],
    pub ignore_globs: &'a [String],
    pub respect_nested_ignore: bool,
    pub stop_at_marker: bool,
}

/// Order-independent projection that actually gets hashed
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalInput<'a> {
    v: u32,
    platform: &'a str,
    roots: BTreeSet<&'a str>,
    ignore_globs: BTreeSet<&'a str>,
    respect_nested_ignore: bool,
    stop_at_marker: bool,
}
