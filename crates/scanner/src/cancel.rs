//! Cooperative cancellation for scans

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag
///
/// The walker polls `is_cancelled()` at the top of every directory visit;
/// an in-flight directory read is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct ScanCancellation {
    flag: Arc<AtomicBool>,
}

impl ScanCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clear the flag before starting a new scan
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let a = ScanCancellation::new();
        let b = a.clone();
        assert!(!b.is_cancelled());

        a.cancel();
        assert!(b.is_cancelled());

        b.reset();
        assert!(!a.is_cancelled());
    }
}
