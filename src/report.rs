//! Per-record outcomes and whole-run statistics.
//!
//! Every record progresses independently through a small state machine:
//!
//! ```text
//! Discovered → Fetched → Extracted → ConvertedXml → ConvertedHtml → PdfSaved
//! ```
//!
//! A failure at any point stops the record there: the outcome keeps the last
//! stage that completed and carries the error that stopped it. (The PLOS path
//! skips `Extracted`/`ConvertedXml` — pandoc converts the manuscript XML to
//! HTML in one hop.) There is no global state machine; records never
//! interact.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};

/// The furthest stage a record completed during a run.
///
/// A failed record keeps the last stage it completed;
/// [`RecordOutcome::error`] marks the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Returned by the catalog; nothing fetched yet.
    Discovered,
    /// Primary artifact (tarball or manuscript XML) staged on disk.
    Fetched,
    /// Tarball unpacked and a main `.tex` file located.
    Extracted,
    /// LaTeX → XML stage succeeded.
    ConvertedXml,
    /// HTML written to the output directory.
    ConvertedHtml,
    /// PDF saved alongside the HTML; fully processed.
    PdfSaved,
}

/// The result of processing one paper record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Source-assigned identifier (arXiv short id or PLOS DOI).
    pub id: String,
    /// Paper title as returned by the catalog.
    pub title: String,
    /// Furthest stage the record completed.
    pub stage: Stage,
    /// The error that stopped this record, if any.
    pub error: Option<RecordError>,
    /// Wall-clock time spent on this record.
    pub duration_ms: u64,
}

impl RecordOutcome {
    /// Whether the record produced its output artifacts.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Shorthand for a record that failed after completing `stage`.
    pub fn failed(
        id: String,
        title: String,
        stage: Stage,
        error: RecordError,
        duration_ms: u64,
    ) -> Self {
        Self {
            id,
            title,
            stage,
            error: Some(error),
            duration_ms,
        }
    }
}

/// Aggregate statistics for a harvest run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// The N the caller asked for.
    pub requested: usize,
    /// Records the catalog actually returned (≤ requested; fewer only when
    /// the upstream catalog was exhausted).
    pub discovered: usize,
    /// Records that produced output artifacts.
    pub succeeded: usize,
    /// Records dropped by a per-record failure.
    pub failed: usize,
    /// Wall-clock duration of the fetch phase.
    pub fetch_duration_ms: u64,
    /// Wall-clock duration of the conversion phase.
    pub convert_duration_ms: u64,
    /// End-to-end run duration, including catalog query and cleanup.
    pub total_duration_ms: u64,
}

/// Complete result of one harvest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-record outcomes, in completion order (not catalog order).
    pub records: Vec<RecordOutcome>,
    /// Aggregate counters and timings.
    pub stats: RunStats,
}

impl RunReport {
    /// Assemble a report from collected outcomes.
    pub fn new(
        requested: usize,
        discovered: usize,
        records: Vec<RecordOutcome>,
        fetch_duration_ms: u64,
        convert_duration_ms: u64,
        total_duration_ms: u64,
    ) -> Self {
        let succeeded = records.iter().filter(|r| r.succeeded()).count();
        let failed = records.len() - succeeded;
        Self {
            records,
            stats: RunStats {
                requested,
                discovered,
                succeeded,
                failed,
                fetch_duration_ms,
                convert_duration_ms,
                total_duration_ms,
            },
        }
    }
}
