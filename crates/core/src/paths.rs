//! Path helpers shared by the scanner and the cache
//!
//! Roots come from user configuration and may contain a leading `~` or the
//! `${userHome}` token. Glob matching always happens on forward-slash paths.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};
use tracing::warn;

/// Placeholder for the user's home directory inside configured roots
pub const HOME_TOKEN: &str = "${userHome}";

/// Resolve the user's home directory
///
/// Falls back to the usual environment variables when the platform lookup
/// fails (e.g. inside minimal containers).
pub fn home_dir() -> Option<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Some(home);
    }

    for var in ["HOME", "USERPROFILE"] {
        if let Some(value) = std::env::var_os(var).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(value));
        }
    }

    match (std::env::var_os("HOMEDRIVE"), std::env::var_os("HOMEPATH")) {
        (Some(drive), Some(path)) => Some(PathBuf::from(drive).join(path)),
        _ => None,
    }
}

/// Expand `~` and `${userHome}` in a configured root
///
/// Relative results are anchored at the current directory. Returns `None`
/// for empty input, or when the root needs a home directory and none is
/// known.
pub fn expand_path(raw: &str, home: Option<&Path>) -> Option<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let expanded = if let Some(rest) = raw.strip_prefix('~') {
        let home = home?;
        // `home.join("/x")` would discard home entirely
        let rest = rest.trim_start_matches(['/', '\\']);
        if rest.is_empty() {
            home.to_path_buf()
        } else {
            home.join(rest)
        }
    } else if raw.contains(HOME_TOKEN) {
        let home = home?;
        PathBuf::from(raw.replace(HOME_TOKEN, &home.to_string_lossy()))
    } else {
        PathBuf::from(raw)
    };

    absolute(expanded)
}

/// Anchor a relative root at the current directory
///
/// Root-relative paths (`\\x` on Windows) are kept as given.
fn absolute(path: PathBuf) -> Option<PathBuf> {
    if path.has_root() {
        return Some(path);
    }

    match std::path::absolute(&path) {
        Ok(abs) => Some(abs),
        Err(e) => {
            warn!("Dropping root {}: {}", path.display(), e);
            None
        }
    }
}

/// Expand every configured root and drop empties and duplicates
///
/// The first occurrence of a root wins, so the user's ordering is kept.
pub fn expand_roots(raw_roots: &[String], home: Option<&Path>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    raw_roots
        .iter()
        .filter_map(|raw| expand_path(raw, home))
        .filter(|root| seen.insert(root.clone()))
        .collect()
}

/// Convert a host path to forward-slash form
pub fn to_posix(path: &Path) -> String {
    let s = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(MAIN_SEPARATOR, "/")
    }
}

/// Append a trailing separator so directory-scoped globs match the directory itself
pub fn with_trailing_separator(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(MAIN_SEPARATOR.to_string());
    PathBuf::from(s)
}

/// Lexically normalize a path (drops `.`, resolves `..`, strips trailing separators)
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Whether two paths name the same location after lexical normalization
pub fn same_path(a: &Path, b: &Path) -> bool {
    normalize_lexical(a) == normalize_lexical(b)
}
