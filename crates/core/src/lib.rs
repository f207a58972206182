//! Shared types for Workspace Chronicle
//!
//! This crate provides:
//! - Scan configuration (`ScanSettings`) and its TOML file
//! - Root path expansion and normalization
//! - Scan gating policy
//! - Configuration signatures used as cache keys

pub mod config;
pub mod gating;
pub mod hash;
pub mod paths;
pub mod platform;

// Re-exports
pub use config::{ConfigError, ScanSettings};
pub use gating::{should_scan, GateInput};
pub use hash::{ScanSignature, SignatureInput, SCHEMA_VERSION};
pub use platform::Platform;

/// File name suffix identifying a workspace marker file
///
/// Matched case-sensitively against the entry name.
pub const MARKER_SUFFIX: &str = ".code-workspace";
