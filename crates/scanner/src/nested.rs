//! Nested `.gitignore` resolution
//!
//! Each directory may carry its own ignore file. Rules are loaded lazily the
//! first time the walker enters a directory and memoized for the rest of the
//! scan. Evaluation folds over the chain of ancestor rule sets from the
//! root-most one inward, so a deeper `!pattern` can re-include what an
//! ancestor excluded.

use ahash::AHashMap;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

/// Name of the per-directory ignore file
pub const IGNORE_FILE: &str = ".gitignore";

/// Per-scan memo of directory -> parsed rules (`None` = no usable rules)
///
/// Must not outlive one scan generation: directory contents can change
/// between scans.
#[derive(Debug, Default)]
pub struct NestedIgnoreCache {
    entries: AHashMap<PathBuf, Option<Arc<Gitignore>>>,
}

impl NestedIgnoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of directories looked up so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.entries.contains_key(dir)
    }
}

/// Load the ignore rules of `dir`, reading the file at most once per cache
pub async fn resolve(dir: &Path, cache: &mut NestedIgnoreCache) -> Option<Arc<Gitignore>> {
    if let Some(hit) = cache.entries.get(dir) {
        return hit.clone();
    }

    let rules = load_rules(dir).await;
    cache.entries.insert(dir.to_path_buf(), rules.clone());
    rules
}

/// Parse `dir/.gitignore`; absent, unreadable or rule-less files yield `None`
async fn load_rules(dir: &Path) -> Option<Arc<Gitignore>> {
    let path = dir.join(IGNORE_FILE);
    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            debug!("Skipping unreadable {}: {}", path.display(), e);
            return None;
        }
    };

    parse_rules(dir, &path, &content)
}

/// Build a rule set from file content
///
/// Blank lines and `#` comments are dropped; lines the matcher rejects are
/// skipped individually.
pub fn parse_rules(base_dir: &Path, source: &Path, content: &str) -> Option<Arc<Gitignore>> {
    let mut builder = GitignoreBuilder::new(base_dir);
    if let Err(e) = builder.case_insensitive(true) {
        debug!("Case-insensitive ignore matching unavailable: {}", e);
    }

    let mut usable = 0usize;
    for line in content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
    {
        match builder.add_line(Some(source.to_path_buf()), line) {
            Ok(_) => usable += 1,
            Err(e) => debug!("Skipping ignore rule {:?} in {}: {}", line, source.display(), e),
        }
    }

    if usable == 0 {
        return None;
    }

    match builder.build() {
        Ok(rules) => Some(Arc::new(rules)),
        Err(e) => {
            warn!("Failed to compile {}: {}", source.display(), e);
            None
        }
    }
}

/// One level of the ignore chain
#[derive(Debug, Clone)]
pub struct ChainLink {
    pub base_dir: PathBuf,
    pub rules: Arc<Gitignore>,
}

/// Ordered ancestor rule sets, root-most first
///
/// Immutable: extending returns a new chain and leaves the parent's intact,
/// so siblings on the walk stack never see each other's rules.
#[derive(Debug, Clone)]
pub struct IgnoreChain {
    links: Arc<[ChainLink]>,
}

impl Default for IgnoreChain {
    fn default() -> Self {
        Self {
            links: Arc::from(Vec::new()),
        }
    }
}

impl IgnoreChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain for the children of `base_dir`
    pub fn extended(&self, base_dir: &Path, rules: Arc<Gitignore>) -> Self {
        let mut links = self.links.to_vec();
        links.push(ChainLink {
            base_dir: base_dir.to_path_buf(),
            rules,
        });
        Self {
            links: links.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Evaluate `target` against every link whose base directory contains it
    ///
    /// A whitelist match clears an ancestor's verdict, an ignore match sets
    /// it, no match keeps it. Links that are not ancestors of `target` are
    /// skipped.
    pub fn is_ignored(&self, target: &Path, is_dir: bool) -> bool {
        self.links.iter().fold(false, |ignored, link| {
            let Ok(relative) = target.strip_prefix(&link.base_dir) else {
                return ignored;
            };
            if relative.as_os_str().is_empty() {
                return ignored;
            }

            match link.rules.matched_path_or_any_parents(relative, is_dir) {
                Match::Whitelist(_) => false,
                Match::Ignore(_) => true,
                Match::None => ignored,
            }
        })
    }
}
