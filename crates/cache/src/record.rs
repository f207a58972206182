//! Persisted scan results

use chrono::{DateTime, Utc};
use chronicle_core::{Platform, ScanSignature, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// On-disk record of the last scan
///
/// Serialized as:
/// ```json
/// {
///   "schemaVersion": 1,
///   "platform": "linux",
///   "signature": "<40 hex chars>",
///   "savedAt": "2024-01-03T14:30:00Z",
///   "files": ["/home/dev/proj/proj.code-workspace"],
///   "partial": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub schema_version: u32,
    pub platform: Platform,
    pub signature: ScanSignature,
    pub saved_at: DateTime<Utc>,
    pub files: Vec<PathBuf>,
    /// The producing scan hit its deadline or was aborted
    pub partial: bool,
}

impl CacheRecord {
    /// Create a record stamped with the current schema version and time
    ///
    /// Paths that are not valid UTF-8 cannot be stored as JSON strings and are
    /// left out so the rest of the result still persists.
    pub fn new(
        signature: ScanSignature,
        platform: Platform,
        files: Vec<PathBuf>,
        partial: bool,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            platform,
            signature,
            saved_at: Utc::now(),
            files: encodable(files),
            partial,
        }
    }

    /// Exact match on schema version, platform and signature
    pub fn matches(&self, signature: &ScanSignature, platform: &Platform) -> bool {
        self.schema_version == SCHEMA_VERSION
            && &self.platform == platform
            && &self.signature == signature
    }

    pub fn into_cached(self) -> CachedScan {
        CachedScan {
            files: self.files,
            partial: self.partial,
        }
    }
}

fn encodable(files: Vec<PathBuf>) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|file| {
            let ok = file.to_str().is_some();
            if !ok {
                warn!("Not caching non UTF-8 path {}", file.display());
            }
            ok
        })
        .collect()
}

/// What a cache hit hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedScan {
    pub files: Vec<PathBuf>,
    pub partial: bool,
}
