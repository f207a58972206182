//! Workspace marker scanner
//!
//! This crate provides:
//! - Case-insensitive glob ignore matching (`GlobIgnore`)
//! - Nested `.gitignore` resolution with per-scan memoization
//! - An iterative, cancellable directory walker
//! - The scan orchestrator: debouncing, generations, throttled snapshots
//!   and the result cache fast path

pub mod cancel;
pub mod ignore;
pub mod nested;
pub mod orchestrator;
pub mod plan;
pub mod walker;

// Re-exports
pub use cancel::ScanCancellation;
pub use self::ignore::{GlobIgnore, DEFAULT_IGNORE_GLOBS};
pub use nested::{IgnoreChain, NestedIgnoreCache};
pub use orchestrator::{
    HostContext, OrchestratorOptions, RefreshOutcome, ScanOrchestrator, Snapshot, SnapshotSource,
};
pub use plan::ScanPlan;
pub use walker::{scan_for_markers, WalkOptions, WalkOutcome, WalkReport, WalkStats};
