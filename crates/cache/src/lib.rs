//! Scan result cache
//!
//! This crate provides:
//! - The persisted `CacheRecord` format
//! - The `ResultCache` trait used by the orchestrator
//! - `FileCache`, a JSON file in the platform data directory

pub mod record;
pub mod store;

// Re-exports
pub use record::{CacheRecord, CachedScan};
pub use store::{default_storage_dir, CacheError, FileCache, ResultCache, CACHE_FILE};
