//! Progress reporting hooks.
//!
//! The library reports progress through a caller-supplied trait object rather
//! than printing directly, so the CLI can render a live progress bar while
//! other embedders log, update a UI, or ignore progress entirely. Records
//! complete out of order in the concurrent arXiv pipeline; implementations
//! must tolerate arbitrary completion order.

use crate::report::{RecordOutcome, RunStats};
use std::sync::Arc;

/// Callbacks fired during a harvest run.
///
/// All methods have empty default bodies; implement only what you need.
/// Callbacks are invoked from async worker tasks, so implementations must be
/// `Send + Sync` and should not block.
pub trait HarvestProgress: Send + Sync {
    /// Fired once after catalog enumeration, with the number of records the
    /// run will actually process (≤ the requested N).
    fn on_run_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Fired as each record finishes, successfully or not.
    /// `done` counts completed records, including this one.
    fn on_record_complete(&self, outcome: &RecordOutcome, done: usize, total: usize) {
        let _ = (outcome, done, total);
    }

    /// Fired once after cleanup, with the final statistics.
    fn on_run_complete(&self, stats: &RunStats) {
        let _ = stats;
    }
}

/// Shared handle to a progress implementation.
pub type ProgressHook = Arc<dyn HarvestProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Stage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        completions: AtomicUsize,
    }

    impl HarvestProgress for Counting {
        fn on_record_complete(&self, _outcome: &RecordOutcome, _done: usize, _total: usize) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_methods_are_no_ops() {
        struct Silent;
        impl HarvestProgress for Silent {}
        let hook: ProgressHook = Arc::new(Silent);
        hook.on_run_start(3);
        hook.on_run_complete(&RunStats::default());
    }

    #[test]
    fn record_completions_are_observed() {
        let hook = Arc::new(Counting::default());
        let outcome = RecordOutcome {
            id: "a".into(),
            title: "t".into(),
            stage: Stage::PdfSaved,
            error: None,
            duration_ms: 1,
        };
        hook.on_record_complete(&outcome, 1, 2);
        hook.on_record_complete(&outcome, 2, 2);
        assert_eq!(hook.completions.load(Ordering::SeqCst), 2);
    }
}
