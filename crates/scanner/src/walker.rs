//! Depth-first marker file walker
//!
//! Walks one root with an explicit stack instead of recursion so that the
//! abort flag and the deadline can be checked between directory visits, and
//! deep trees cannot overflow the call stack. Discoveries are streamed to the
//! caller as they happen; an early exit leaves the caller with a prefix of
//! the full result, never a corrupted one.

use crate::ignore::GlobIgnore;
use crate::nested::{self, IgnoreChain, NestedIgnoreCache};
use chronicle_core::MARKER_SUFFIX;
use std::fs::FileType;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Options for one root walk
pub struct WalkOptions<'a> {
    /// Stop descending once this instant has passed
    pub deadline: Instant,
    /// Apply nested `.gitignore` files
    pub respect_nested_ignore: bool,
    /// Do not descend below a directory that directly holds a marker file
    pub stop_at_marker: bool,
    /// Rule memo shared by all roots of one scan
    pub nested_cache: &'a mut NestedIgnoreCache,
    /// Compiled glob ignore list
    pub glob_ignore: &'a GlobIgnore,
}

/// Why a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Every reachable directory was visited
    Completed,
    /// The deadline passed before the stack drained
    DeadlineExceeded,
    /// The abort predicate returned true
    Aborted,
}

impl WalkOutcome {
    pub fn is_complete(self) -> bool {
        self == WalkOutcome::Completed
    }
}

/// Counters collected during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Directories whose entries were listed
    pub dirs_visited: usize,
    /// Directories dropped by glob or nested ignore rules
    pub dirs_skipped: usize,
    /// Directories that could not be listed
    pub dirs_unreadable: usize,
    /// Marker files reported
    pub markers_found: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkReport {
    pub outcome: WalkOutcome,
    pub stats: WalkStats,
}

/// Pending directory and the ignore chain inherited from its parent
struct Frame {
    dir: PathBuf,
    chain: IgnoreChain,
}

/// Walk `root` and report every marker file that survives the ignore layers
///
/// `on_found` receives full paths. `is_aborted` is polled at the top of every
/// iteration together with the deadline.
pub async fn scan_for_markers<F, A>(
    root: &Path,
    options: WalkOptions<'_>,
    mut on_found: F,
    is_aborted: A,
) -> WalkReport
where
    F: FnMut(PathBuf),
    A: Fn() -> bool,
{
    let WalkOptions {
        deadline,
        respect_nested_ignore,
        stop_at_marker,
        nested_cache,
        glob_ignore,
    } = options;

    let mut stats = WalkStats::default();
    let mut stack = vec![Frame {
        dir: root.to_path_buf(),
        chain: IgnoreChain::new(),
    }];

    while let Some(Frame { dir, chain }) = stack.pop() {
        if is_aborted() {
            return WalkReport {
                outcome: WalkOutcome::Aborted,
                stats,
            };
        }
        if Instant::now() > deadline {
            return WalkReport {
                outcome: WalkOutcome::DeadlineExceeded,
                stats,
            };
        }

        // 1. Glob ignores, then nested ignore files
        if glob_ignore.is_dir_ignored(&dir)
            || (respect_nested_ignore && chain.is_ignored(&dir, true))
        {
            stats.dirs_skipped += 1;
            continue;
        }

        // 2. This directory's own rules apply to everything below it
        let chain = if respect_nested_ignore {
            match nested::resolve(&dir, nested_cache).await {
                Some(rules) => chain.extended(&dir, rules),
                None => chain,
            }
        } else {
            chain
        };

        // 3. List entries; unreadable directories are skipped
        let entries = match read_entries(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if is_expected_read_error(&e) {
                    debug!("Skipping {}: {}", dir.display(), e);
                } else {
                    warn!("Failed to read directory {}: {}", dir.display(), e);
                }
                stats.dirs_unreadable += 1;
                continue;
            }
        };
        stats.dirs_visited += 1;

        // 4. Marker files directly in this directory
        let mut found_here = false;
        for (path, file_type) in &entries {
            if !file_type.is_file() || !is_marker(path) {
                continue;
            }
            if glob_ignore.is_file_ignored(path) {
                continue;
            }
            if respect_nested_ignore && chain.is_ignored(path, false) {
                continue;
            }

            found_here = true;
            stats.markers_found += 1;
            on_found(path.clone());
        }

        // 5. Prune below a found marker
        if found_here && stop_at_marker {
            continue;
        }

        // 6. Descend; symlinks are never followed
        for (path, file_type) in entries {
            if !file_type.is_dir() || file_type.is_symlink() {
                continue;
            }
            if glob_ignore.is_dir_ignored(&path) {
                stats.dirs_skipped += 1;
                continue;
            }
            if respect_nested_ignore && chain.is_ignored(&path, true) {
                stats.dirs_skipped += 1;
                continue;
            }

            stack.push(Frame {
                dir: path,
                chain: chain.clone(),
            });
        }
    }

    WalkReport {
        outcome: WalkOutcome::Completed,
        stats,
    }
}

/// Whether the entry name carries the marker suffix (case-sensitive)
pub fn is_marker(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(MARKER_SUFFIX))
        .unwrap_or(false)
}

/// List a directory without following symlinks for entry types
async fn read_entries(dir: &Path) -> io::Result<Vec<(PathBuf, FileType)>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        match entry.file_type().await {
            Ok(file_type) => entries.push((entry.path(), file_type)),
            Err(e) => debug!("Skipping entry {}: {}", entry.path().display(), e),
        }
    }

    Ok(entries)
}

/// Errors that only mean "this directory is not walkable"
fn is_expected_read_error(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied)
        || is_path_shape_error(e)
}

/// Not-a-directory and symlink-loop errors (no stable `ErrorKind` for these)
#[cfg(unix)]
fn is_path_shape_error(e: &io::Error) -> bool {
    use nix::errno::Errno;

    e.raw_os_error()
        .map(Errno::from_i32)
        .map_or(false, |errno| matches!(errno, Errno::ENOTDIR | Errno::ELOOP))
}

#[cfg(windows)]
fn is_path_shape_error(e: &io::Error) -> bool {
    const ERROR_DIRECTORY: i32 = 267;
    const ERROR_CANT_RESOLVE_FILENAME: i32 = 1921;

    matches!(
        e.raw_os_error(),
        Some(ERROR_DIRECTORY) | Some(ERROR_CANT_RESOLVE_FILENAME)
    )
}

#[cfg(not(any(unix, windows)))]
fn is_path_shape_error(_e: &io::Error) -> bool {
    false
}
