//! Effective scan configuration
//!
//! Turns user-facing `ScanSettings` into everything one scan needs: expanded
//! roots, the ordered ignore-glob list, time budgets and the cache signature.

use crate::ignore::{subtree_glob, DEFAULT_IGNORE_GLOBS, HOME_CONFIG_DIRS, WINDOWS_IGNORE_GLOBS};
use chronicle_core::paths::{expand_roots, same_path};
use chronicle_core::{Platform, ScanSettings, ScanSignature, SignatureInput};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Immutable inputs of a single scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Absolute roots, deduplicated, in configured order
    pub roots: Vec<PathBuf>,
    /// Defaults, user globs, platform globs, then home-root globs
    pub ignore_globs: Vec<String>,
    pub respect_nested_ignore: bool,
    pub stop_at_marker: bool,
    /// Wall-clock budget across all roots
    pub timeout: Duration,
    /// Minimum gap between progress snapshots
    pub update_interval: Duration,
    pub platform: Platform,
    /// Cache key
    pub signature: ScanSignature,
}

impl ScanPlan {
    pub fn build(settings: &ScanSettings, platform: &Platform, home: Option<&Path>) -> Self {
        let roots = expand_roots(&settings.roots, home);

        let mut ignore_globs: Vec<String> = Vec::new();
        if settings.use_default_ignore {
            ignore_globs.extend(DEFAULT_IGNORE_GLOBS.iter().map(|g| g.to_string()));
        }
        ignore_globs.extend(settings.extra_ignore.iter().cloned());

        if platform.is_windows() {
            ignore_globs.extend(WINDOWS_IGNORE_GLOBS.iter().map(|g| g.to_string()));
        }

        // Home config dirs are only excluded when the home itself is a root
        if let Some(home) = home {
            for root in roots.iter().filter(|root| same_path(root, home)) {
                for dir in HOME_CONFIG_DIRS {
                    ignore_globs.push(subtree_glob(&root.join(dir)));
                }
            }
        }

        let root_strings: Vec<String> = roots
            .iter()
            .map(|root| root.to_string_lossy().into_owned())
            .collect();
        let signature = ScanSignature::compute(&SignatureInput {
            platform,
            roots: &root_strings,
            ignore_globs: &ignore_globs,
            respect_nested_ignore: settings.respect_nested_ignore,
            stop_at_marker: settings.stop_at_marker,
        });

        Self {
            roots,
            ignore_globs,
            respect_nested_ignore: settings.respect_nested_ignore,
            stop_at_marker: settings.stop_at_marker,
            timeout: Duration::from_millis(settings.scan_timeout_ms),
            update_interval: Duration::from_millis(settings.scan_update_interval_ms),
            platform: platform.clone(),
            signature,
        }
    }

    pub fn has_roots(&self) -> bool {
        !self.roots.is_empty()
    }
}
