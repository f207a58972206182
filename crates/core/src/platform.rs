//! Platform identifier

use serde::{Deserialize, Serialize};

/// Identifies the operating system a scan ran on
///
/// Cached results are only valid for the platform that produced them since
/// path syntax and default ignore globs differ between platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Platform(String);

impl Platform {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Platform of the running process (`linux`, `macos`, `windows`, ...)
    pub fn current() -> Self {
        Self(std::env::consts::OS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_windows(&self) -> bool {
        self.0 == "windows"
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
