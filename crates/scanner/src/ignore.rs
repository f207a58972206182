//! Glob ignore patterns for the workspace scanner
//!
//! Ignore globs come from three places, concatenated in this order:
//! 1. Built-in patterns (dependency dirs, build outputs, caches; optional)
//! 2. User patterns from the configuration
//! 3. Platform and home-root patterns added by the scan plan
//!
//! All patterns are compiled into one `GlobSet` that is matched
//! case-insensitively against forward-slash paths. Dotfiles are never
//! special-cased.

use chronicle_core::paths::{to_posix, with_trailing_separator};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::{debug, warn};

/// Built-in ignore globs
///
/// Kept conservative and broadly applicable; users extend via settings.
pub const DEFAULT_IGNORE_GLOBS: &[&str] = &[
    "**/.git/**",
    "**/.hg/**",
    "**/.svn/**",
    "**/node_modules/**",
    "**/bower_components/**",
    "**/vendor/**",
    // Java / JVM
    "**/.gradle/**",
    "**/target/**",
    // Rust
    "**/target/**",
    // .NET (C#/F#)
    "**/bin/**",
    "**/obj/**",
    // Python
    "**/__pycache__/**",
    "**/.venv/**",
    "**/venv/**",
    "**/.tox/**",
    "**/.mypy_cache/**",
    "**/.pytest_cache/**",
    "**/.ruff_cache/**",
    // Node/JS tooling
    "**/.next/**",
    "**/.nuxt/**",
    "**/.turbo/**",
    "**/.yarn/**",
    "**/.pnpm-store/**",
    // Ruby
    "**/.bundle/**",
    "**/vendor/bundle/**",
    // Common build outputs
    "**/dist/**",
    "**/build/**",
    "**/out/**",
    "**/coverage/**",
    // Editor/cache dirs
    "**/.idea/**",
    "**/.cache/**",
];

/// Extra globs on Windows, where profile data lives under the home root
pub const WINDOWS_IGNORE_GLOBS: &[&str] = &["**/AppData/**", "**/Application Data/**"];

/// Config directories excluded only when the scan root is the home directory
pub const HOME_CONFIG_DIRS: &[&str] = &[".vscode", ".kiro"];

/// Compiled glob ignore predicate
#[derive(Debug, Clone)]
pub struct GlobIgnore {
    set: GlobSet,
}

impl GlobIgnore {
    /// Compile a list of glob patterns
    ///
    /// Patterns that fail to parse are logged and skipped, so a bad user
    /// glob never matches anything (and never matches everything).
    pub fn compile<S: AsRef<str>>(globs: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut added = 0usize;

        for pattern in globs {
            let pattern = pattern.as_ref();
            match GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
            {
                Ok(glob) => {
                    builder.add(glob);
                    added += 1;
                }
                Err(e) => warn!("Skipping invalid ignore glob {:?}: {}", pattern, e),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            warn!("Failed to build ignore glob set, ignoring nothing: {}", e);
            GlobSet::empty()
        });

        debug!("Compiled {} ignore globs", added);
        Self { set }
    }

    /// Matcher that ignores nothing
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    /// Test a path exactly as given (after separator normalization)
    pub fn is_match(&self, path: &Path) -> bool {
        self.set.is_match(to_posix(path))
    }

    /// Test a file path
    pub fn is_file_ignored(&self, file: &Path) -> bool {
        self.is_match(file)
    }

    /// Test a directory with a trailing separator appended
    ///
    /// `**/node_modules/**` then matches `.../node_modules/` itself, not
    /// only its descendants.
    pub fn is_dir_ignored(&self, dir: &Path) -> bool {
        self.is_match(&with_trailing_separator(dir))
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Glob excluding everything below `dir`, with glob metacharacters in the path escaped
pub fn subtree_glob(dir: &Path) -> String {
    let posix = to_posix(dir);
    format!("{}/**", globset::escape(posix.trim_end_matches('/')))
}
