//! Durable result cache
//!
//! Manages a single JSON file under the app data directory:
//! ```text
//! <data_dir>/workspace-chronicle/
//!   workspace-files-cache.json
//! ```
//!
//! The cache is advisory. A missing file, a mismatched key or a corrupt
//! record is a miss, never an error the scan has to care about.

use crate::record::{CacheRecord, CachedScan};
use async_trait::async_trait;
use chronicle_core::config::APP_NAME;
use chronicle_core::{Platform, ScanSignature};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Cache file name inside the storage directory
pub const CACHE_FILE: &str = "workspace-files-cache.json";

/// Cache I/O errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not determine the data directory")]
    NoDataDir,

    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage for the last scan result, keyed by configuration signature
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Load the cached result if schema version, platform and signature all match
    async fn get(
        &self,
        signature: &ScanSignature,
        platform: &Platform,
    ) -> Result<Option<CachedScan>, CacheError>;

    /// Replace the cached result
    async fn set(
        &self,
        signature: &ScanSignature,
        platform: &Platform,
        files: &[PathBuf],
        partial: bool,
    ) -> Result<(), CacheError>;

    /// Forget the cached result
    async fn clear(&self) -> Result<(), CacheError>;
}

/// JSON-file backed cache
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache stored in the platform data directory
    pub fn open_default() -> Result<Self, CacheError> {
        let dir = default_storage_dir().ok_or(CacheError::NoDataDir)?;
        Ok(Self { dir })
    }

    /// Cache stored in an explicit directory
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the cache file
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }

    /// Read the raw record regardless of key
    ///
    /// A corrupt file is logged and reported as absent.
    pub async fn read_record(&self) -> Result<Option<CacheRecord>, CacheError> {
        let path = self.file_path();
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        match serde_json::from_slice(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Ignoring unreadable scan cache {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Write a record atomically (temp file + rename)
    pub async fn write_record(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let data = serde_json::to_vec_pretty(record)?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;
        atomic_write(&self.file_path(), &data).await
    }
}

#[async_trait]
impl ResultCache for FileCache {
    async fn get(
        &self,
        signature: &ScanSignature,
        platform: &Platform,
    ) -> Result<Option<CachedScan>, CacheError> {
        let Some(record) = self.read_record().await? else {
            return Ok(None);
        };

        if !record.matches(signature, platform) {
            debug!(
                "Scan cache miss (stored {} on {}, wanted {} on {})",
                record.signature, record.platform, signature, platform
            );
            return Ok(None);
        }

        Ok(Some(record.into_cached()))
    }

    async fn set(
        &self,
        signature: &ScanSignature,
        platform: &Platform,
        files: &[PathBuf],
        partial: bool,
    ) -> Result<(), CacheError> {
        let record = CacheRecord::new(*signature, platform.clone(), files.to_vec(), partial);
        self.write_record(&record).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let path = self.file_path();
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Missing cache is the normal case
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }
}

/// `<data_dir>/workspace-chronicle`
pub fn default_storage_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_NAME))
}

/// Write `data` next to `target` then rename over it
async fn atomic_write(target: &Path, data: &[u8]) -> Result<(), CacheError> {
    let tmp = target.with_extension(format!("json.tmp-{}", std::process::id()));

    fs::write(&tmp, data)
        .await
        .map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;

    if let Err(source) = fs::rename(&tmp, target).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(CacheError::Io {
            path: target.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sig(byte: u8) -> ScanSignature {
        ScanSignature::from_bytes([byte; 20])
    }

    fn files() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/a/x.code-workspace"),
            PathBuf::from("/b/y.code-workspace"),
        ]
    }

    #[tokio::test]
    async fn test_roundtrip_by_signature() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        let platform = Platform::current();

        cache.set(&sig(1), &platform, &files(), false).await.unwrap();

        let loaded = cache.get(&sig(1), &platform).await.unwrap().unwrap();
        assert_eq!(loaded.files, files());
        assert!(!loaded.partial);
    }

    #[tokio::test]
    async fn test_partial_flag_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        let platform = Platform::current();

        cache.set(&sig(1), &platform, &files()[..1], true).await.unwrap();

        let loaded = cache.get(&sig(1), &platform).await.unwrap().unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert!(loaded.partial);
    }

    #[tokio::test]
    async fn test_signature_mismatch_is_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        let platform = Platform::current();

        cache.set(&sig(1), &platform, &files(), false).await.unwrap();
        assert!(cache.get(&sig(2), &platform).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_platform_mismatch_is_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());

        cache.set(&sig(1), &Platform::new("linux"), &files(), false).await.unwrap();
        assert!(cache
            .get(&sig(1), &Platform::new("windows"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_schema_version_mismatch_is_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        let platform = Platform::current();

        let mut record = CacheRecord::new(sig(1), platform.clone(), files(), false);
        record.schema_version += 1;
        cache.write_record(&record).await.unwrap();

        assert!(cache.get(&sig(1), &platform).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_record() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        let platform = Platform::current();

        cache.set(&sig(1), &platform, &files(), false).await.unwrap();
        assert!(cache.get(&sig(1), &platform).await.unwrap().is_some());

        cache.clear().await.unwrap();
        assert!(cache.get(&sig(1), &platform).await.unwrap().is_none());
        assert!(!cache.file_path().exists());
    }

    #[tokio::test]
    async fn test_clear_without_file_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path().join("never-created"));
        cache.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        std::fs::write(cache.file_path(), b"{ not json").unwrap();

        assert!(cache.get(&sig(1), &Platform::current()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_creates_storage_dir_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a/b");
        let cache = FileCache::at(&dir);

        cache.set(&sig(1), &Platform::current(), &files(), false).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(CACHE_FILE)]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_path_does_not_block_write() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::at(temp_dir.path());
        let platform = Platform::current();

        let good = PathBuf::from("/home/dev/cafe/a.code-workspace");
        let bad = PathBuf::from(OsStr::from_bytes(b"/home/dev/caf\xe9/b.code-workspace"));

        cache
            .set(&sig(1), &platform, &[good.clone(), bad], false)
            .await
            .unwrap();

        let loaded = cache.get(&sig(1), &platform).await.unwrap().unwrap();
        assert_eq!(loaded.files, vec![good]);
        assert!(!loaded.partial);
    }
}
