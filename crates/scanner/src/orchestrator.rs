//! Scan orchestration
//!
//! Owns the visible result set and decides when the filesystem is walked:
//! - Debounces bursts of refresh requests into one scan
//! - Tags every scan with a generation; only the current generation may
//!   change the visible set
//! - Serializes walks (one at a time), queuing later requests
//! - Streams throttled progress snapshots, then one final snapshot
//! - Shows the cached result of an identical configuration while scanning
//!   and stores the new result afterwards

use crate::cancel::ScanCancellation;
use crate::ignore::GlobIgnore;
use crate::nested::NestedIgnoreCache;
use crate::plan::ScanPlan;
use crate::walker::{self, WalkOptions};
use ahash::AHashSet;
use cache::ResultCache;
use chronicle_core::paths::home_dir;
use chronicle_core::{should_scan, GateInput, Platform, ScanSettings};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default delay used to coalesce refresh requests
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// What the host currently has open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostContext {
    /// A folder is open
    pub has_primary_context: bool,
    /// A marker file is the active context
    pub has_marker_context: bool,
}

/// Where a snapshot's files came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Cache,
    Scan,
}

/// Cumulative visible result, pushed to the consumer on every change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub files: Vec<PathBuf>,
    /// Deadline or cancellation cut the producing scan short
    pub partial: bool,
    pub source: SnapshotSource,
    /// Last snapshot of its scan
    pub complete: bool,
}

/// Result of one refresh run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Gating blocked the walk (a cache preview may still have been shown)
    Gated,
    /// A newer generation was requested while this one waited its turn
    Coalesced { generation: u64 },
    /// The walk ran
    Scanned {
        generation: u64,
        files: Vec<PathBuf>,
        partial: bool,
        /// The final snapshot reached the visible set
        applied: bool,
    },
}

/// Construction options
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub debounce: Duration,
    pub platform: Platform,
    /// Home directory for `~` expansion and home-root globs
    pub home: Option<PathBuf>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            platform: Platform::current(),
            home: home_dir(),
        }
    }
}

/// Cheaply cloneable handle to the scan state machine
///
/// `refresh()` spawns onto the ambient tokio runtime and must be called from
/// within one.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    settings: RwLock<ScanSettings>,
    context: RwLock<HostContext>,
    cache: Arc<dyn ResultCache>,
    platform: Platform,
    home: Option<PathBuf>,
    debounce: Duration,

    /// Latest minted generation
    generation: AtomicU64,

    /// Files currently shown to the consumer
    visible: Mutex<Vec<PathBuf>>,

    /// Snapshot stream
    updates: mpsc::UnboundedSender<Snapshot>,

    /// Debounce timer waiting to start a run
    pending: Mutex<Option<JoinHandle<()>>>,

    /// Held for the duration of a walk
    scan_lock: tokio::sync::Mutex<()>,

    cancel: ScanCancellation,
}

impl ScanOrchestrator {
    /// Create an orchestrator and the receiving end of its snapshot stream
    pub fn new(
        settings: ScanSettings,
        cache: Arc<dyn ResultCache>,
        options: OrchestratorOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Snapshot>) {
        let (updates, rx) = mpsc::unbounded_channel();

        let inner = Inner {
            settings: RwLock::new(checked(settings)),
            context: RwLock::new(HostContext::default()),
            cache,
            platform: options.platform,
            home: options.home,
            debounce: options.debounce,
            generation: AtomicU64::new(0),
            visible: Mutex::new(Vec::new()),
            updates,
            pending: Mutex::new(None),
            scan_lock: tokio::sync::Mutex::new(()),
            cancel: ScanCancellation::new(),
        };

        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    /// Request a scan after the debounce delay
    ///
    /// A request arriving before the delay elapses replaces the pending one.
    pub fn refresh(&self) {
        let inner = Arc::clone(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;

            // Detach the run so a later refresh only cancels the timer
            let generation = inner.next_generation();
            tokio::spawn(async move {
                let outcome = inner.run(generation, false).await;
                debug!("Debounced refresh finished: {:?}", summarize(&outcome));
            });
        });

        if let Some(previous) = self.inner.pending.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Run a refresh immediately, bypassing the debounce delay
    pub async fn refresh_now(&self) -> RefreshOutcome {
        let generation = self.inner.next_generation();
        self.inner.run(generation, false).await
    }

    /// Drop the durable cache and the visible set, then scan regardless of gating
    pub async fn clear_cache_and_rescan(&self) -> RefreshOutcome {
        if let Err(e) = self.inner.cache.clear().await {
            warn!("Failed to clear scan cache: {}", e);
        }

        let generation = self.inner.next_generation();
        self.inner
            .apply(generation, Vec::new(), SnapshotSource::Scan, false, false);
        self.inner.run(generation, true).await
    }

    /// Stop the in-flight walk at its next directory boundary
    ///
    /// The files found so far are still delivered and cached as partial.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    pub fn set_context(&self, context: HostContext) {
        *self.inner.context.write() = context;
    }

    /// Replace the settings used by the next refresh
    pub fn update_settings(&self, settings: ScanSettings) {
        *self.inner.settings.write() = checked(settings);
    }

    pub fn settings(&self) -> ScanSettings {
        self.inner.settings.read().clone()
    }

    /// Effective plan for the current settings
    pub fn plan(&self) -> ScanPlan {
        self.inner.plan()
    }

    pub fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn visible_files(&self) -> Vec<PathBuf> {
        self.inner.visible.lock().clone()
    }
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn plan(&self) -> ScanPlan {
        let settings = self.settings.read().clone();
        ScanPlan::build(&settings, &self.platform, self.home.as_deref())
    }

    /// Replace the visible set if `generation` is still current
    fn apply(
        &self,
        generation: u64,
        files: Vec<PathBuf>,
        source: SnapshotSource,
        partial: bool,
        complete: bool,
    ) -> bool {
        let mut visible = self.visible.lock();
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!("Discarding snapshot of stale generation {}", generation);
            return false;
        }

        *visible = files.clone();
        // Receiver may be gone; the visible set is still authoritative
        let _ = self.updates.send(Snapshot {
            generation,
            files,
            partial,
            source,
            complete,
        });
        true
    }

    async fn run(&self, generation: u64, force: bool) -> RefreshOutcome {
        let plan = self.plan();
        let context = *self.context.read();

        let nothing_visible = self.visible.lock().is_empty();
        if nothing_visible {
            self.preview_from_cache(&plan, generation).await;
        }

        let settings_gate = {
            let settings = self.settings.read();
            (
                settings.scan_when_no_primary_context,
                settings.scan_when_marker_context,
            )
        };
        let allowed = should_scan(GateInput {
            has_primary_context: context.has_primary_context,
            has_marker_context: context.has_marker_context,
            allow_without_primary_context: settings_gate.0,
            allow_with_marker_context: settings_gate.1,
        });
        if !allowed && !force {
            debug!("Scan gated off for {:?}", context);
            return RefreshOutcome::Gated;
        }

        // Queue behind the in-flight walk
        let _guard = self.scan_lock.lock().await;
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!("Generation {} superseded while queued", generation);
            return RefreshOutcome::Coalesced { generation };
        }
        self.cancel.reset();

        if !plan.has_roots() {
            let applied = self.apply(generation, Vec::new(), SnapshotSource::Scan, false, true);
            return RefreshOutcome::Scanned {
                generation,
                files: Vec::new(),
                partial: false,
                applied,
            };
        }

        let (files, partial) = self.walk(&plan, generation).await;
        let applied = self.apply(
            generation,
            files.clone(),
            SnapshotSource::Scan,
            partial,
            true,
        );

        // Stale runs still refresh the cache under their own signature
        if let Err(e) = self
            .cache
            .set(&plan.signature, &plan.platform, &files, partial)
            .await
        {
            warn!("Failed to persist scan cache: {}", e);
        }

        RefreshOutcome::Scanned {
            generation,
            files,
            partial,
            applied,
        }
    }

    async fn preview_from_cache(&self, plan: &ScanPlan, generation: u64) {
        match self.cache.get(&plan.signature, &plan.platform).await {
            Ok(Some(cached)) if !cached.files.is_empty() => {
                debug!("Showing {} cached workspace files", cached.files.len());
                self.apply(
                    generation,
                    cached.files,
                    SnapshotSource::Cache,
                    cached.partial,
                    false,
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to load scan cache: {}", e),
        }
    }

    /// Walk every root under one global deadline
    ///
    /// Returns the found files in discovery order and whether the walk was
    /// cut short.
    async fn walk(&self, plan: &ScanPlan, generation: u64) -> (Vec<PathBuf>, bool) {
        let glob_ignore = GlobIgnore::compile(&plan.ignore_globs);
        let started = Instant::now();
        let deadline = started + plan.timeout;
        let mut nested_cache = NestedIgnoreCache::new();
        let mut progress = Progress::new(plan.update_interval);
        let mut partial = false;

        for root in &plan.roots {
            if self.cancel.is_cancelled() || Instant::now() > deadline {
                partial = true;
                break;
            }

            let report = walker::scan_for_markers(
                root,
                WalkOptions {
                    deadline,
                    respect_nested_ignore: plan.respect_nested_ignore,
                    stop_at_marker: plan.stop_at_marker,
                    nested_cache: &mut nested_cache,
                    glob_ignore: &glob_ignore,
                },
                |file| {
                    if progress.record(file) && progress.due() {
                        self.apply(
                            generation,
                            progress.files.clone(),
                            SnapshotSource::Scan,
                            false,
                            false,
                        );
                    }
                },
                || self.cancel.is_cancelled(),
            )
            .await;

            debug!("Walked {}: {:?}", root.display(), report);
            if !report.outcome.is_complete() {
                partial = true;
                break;
            }
        }

        let files = progress.files;
        if partial {
            info!(
                "Scan stopped early after {:?}. Found {} workspace files (partial)",
                started.elapsed(),
                files.len()
            );
        } else {
            info!(
                "Found {} workspace files across {} roots in {:?}",
                files.len(),
                plan.roots.len(),
                started.elapsed()
            );
        }

        (files, partial)
    }
}

/// Accumulated discoveries and the progress throttle
struct Progress {
    files: Vec<PathBuf>,
    seen: AHashSet<PathBuf>,
    interval: Duration,
    last_emit: Option<Instant>,
}

impl Progress {
    fn new(interval: Duration) -> Self {
        Self {
            files: Vec::new(),
            seen: AHashSet::new(),
            interval,
            last_emit: None,
        }
    }

    /// Add a file; overlapping roots may report the same one twice
    fn record(&mut self, file: PathBuf) -> bool {
        if !self.seen.insert(file.clone()) {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Whether a progress snapshot may be emitted now
    fn due(&mut self) -> bool {
        let now = Instant::now();
        let due = self.interval.is_zero()
            || self
                .last_emit
                .map_or(true, |last| now.duration_since(last) >= self.interval);
        if due {
            self.last_emit = Some(now);
        }
        due
    }
}

/// Invalid settings degrade to an empty root set
fn checked(settings: ScanSettings) -> ScanSettings {
    match settings.validate() {
        Ok(()) => settings,
        Err(e) => {
            warn!("Unusable scan settings, scanning nothing: {}", e);
            ScanSettings::degraded()
        }
    }
}

fn summarize(outcome: &RefreshOutcome) -> String {
    match outcome {
        RefreshOutcome::Gated => "gated".to_string(),
        RefreshOutcome::Coalesced { generation } => format!("coalesced (gen {})", generation),
        RefreshOutcome::Scanned {
            generation,
            files,
            partial,
            applied,
        } => format!(
            "gen {}: {} files, partial={}, applied={}",
            generation,
            files.len(),
            partial,
            applied
        ),
    }
}
