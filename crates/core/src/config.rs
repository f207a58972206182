//! Scan configuration
//!
//! Settings live in a TOML file under the platform config directory:
//!
//! ```text
//! <config_dir>/workspace-chronicle/config.toml
//! ```
//!
//! Every key is optional. A file that cannot be parsed degrades to a
//! configuration with no roots, which produces an empty scan instead of an
//! error.

use crate::paths::HOME_TOKEN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Directory name used for both configuration and data storage
pub const APP_NAME: &str = "workspace-chronicle";

/// Config file name inside the app config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Default scan timeout (30 seconds)
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 30_000;

/// Default minimum interval between partial snapshots
pub const DEFAULT_SCAN_UPDATE_INTERVAL_MS: u64 = 500;

const MAX_SCAN_TIMEOUT_MS: u64 = 60 * 60 * 1000;
const MAX_SCAN_UPDATE_INTERVAL_MS: u64 = 60_000;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Inputs consumed by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Root directories; may use `~` or `${userHome}`
    pub roots: Vec<String>,

    /// Wall-clock budget for one scan across all roots
    pub scan_timeout_ms: u64,

    /// Minimum interval between partial snapshots (0 = every discovery)
    pub scan_update_interval_ms: u64,

    /// Include the built-in ignore globs
    pub use_default_ignore: bool,

    /// Honor `.gitignore` files found during the walk
    pub respect_nested_ignore: bool,

    /// Do not descend below a directory that directly contains a marker file
    pub stop_at_marker: bool,

    /// Additional user ignore globs
    pub extra_ignore: Vec<String>,

    /// Gating: scan when the host has no primary folder context
    pub scan_when_no_primary_context: bool,

    /// Gating: scan when a marker file is the active host context
    pub scan_when_marker_context: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            roots: vec![HOME_TOKEN.to_string()],
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
            scan_update_interval_ms: DEFAULT_SCAN_UPDATE_INTERVAL_MS,
            use_default_ignore: true,
            respect_nested_ignore: true,
            stop_at_marker: true,
            extra_ignore: vec![],
            scan_when_no_primary_context: true,
            scan_when_marker_context: true,
        }
    }
}

impl ScanSettings {
    /// Settings used when the configuration is unusable: defaults, no roots
    pub fn degraded() -> Self {
        Self {
            roots: vec![],
            ..Self::default()
        }
    }

    /// Validate numeric ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_timeout_ms == 0 || self.scan_timeout_ms > MAX_SCAN_TIMEOUT_MS {
            return Err(ConfigError::Invalid {
                key: "scan_timeout_ms",
                reason: format!("must be between 1 and {}", MAX_SCAN_TIMEOUT_MS),
            });
        }

        if self.scan_update_interval_ms > MAX_SCAN_UPDATE_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                key: "scan_update_interval_ms",
                reason: format!("must be between 0 and {}", MAX_SCAN_UPDATE_INTERVAL_MS),
            });
        }

        Ok(())
    }
}

/// Path of the user config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

/// Load settings from the default location
///
/// A missing file yields defaults.
pub fn load() -> Result<ScanSettings, ConfigError> {
    let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
    load_from(&path)
}

/// Load settings from an explicit file
pub fn load_from(path: &Path) -> Result<ScanSettings, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ScanSettings::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings, degrading to an empty root set on any error
pub fn load_or_degraded(path: Option<&Path>) -> ScanSettings {
    let result = match path {
        Some(path) => load_from(path),
        None => load(),
    };

    match result.and_then(|settings| settings.validate().map(|_| settings)) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Unusable scan configuration, scanning nothing: {}", e);
            ScanSettings::degraded()
        }
    }
}

/// Save settings to the default location
pub fn save(settings: &ScanSettings) -> Result<(), ConfigError> {
    let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(&path, settings)
}

/// Save settings to an explicit file, creating parent directories
pub fn save_to(path: &Path, settings: &ScanSettings) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(settings)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a default config file if none exists yet
///
/// Returns the path and whether a file was created.
pub fn init_if_missing() -> Result<(PathBuf, bool), ConfigError> {
    let path = config_file_path().ok_or(ConfigError::NoConfigDir)?;
    if path.exists() {
        return Ok((path, false));
    }
    save_to(&path, &ScanSettings::default())?;
    Ok((path, true))
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# Workspace Chronicle scan configuration

# Directories to search for .code-workspace files.
# "~" and "${userHome}" expand to your home directory.
roots = ["${userHome}"]

# Stop scanning after this many milliseconds (results are kept as partial)
scan_timeout_ms = 30000

# Minimum milliseconds between progress snapshots (0 = report every file)
scan_update_interval_ms = 500

# Skip node_modules, target, .git, build outputs, ...
use_default_ignore = true

# Honor .gitignore files found while scanning
respect_nested_ignore = true

# Do not look below a directory that already contains a workspace file
stop_at_marker = true

# Extra glob patterns to skip, e.g. ["**/go/pkg/**"]
extra_ignore = []

# Scan when no folder is open
scan_when_no_primary_context = true

# Scan when a workspace file is the active context
scan_when_marker_context = true
"#
}
