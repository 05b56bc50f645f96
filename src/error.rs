//! Error types for the paper2html library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`HarvestError`] — **Fatal**: the run cannot proceed at all (catalog API
//!   unreachable or unparseable, staging directories cannot be created, bad
//!   configuration). Returned as `Err(HarvestError)` from the top-level
//!   `harvest_*` functions.
//!
//! * [`RecordError`] — **Non-fatal**: a single paper failed (404 on its
//!   e-print, corrupt tarball, converter exited non-zero) but all other papers
//!   are fine. Stored inside [`crate::report::RecordOutcome`] so callers can
//!   inspect partial success rather than losing the whole batch to one bad
//!   record.
//!
//! There is no retry anywhere: a failed record is logged, its outcome keeps
//! the last stage it completed with the error attached, and it is skipped.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the paper2html library.
///
/// Record-level failures use [`RecordError`] and are stored in
/// [`crate::report::RecordOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum HarvestError {
    // ── Catalog errors ────────────────────────────────────────────────────
    /// The catalog search API could not be reached or returned an error status.
    #[error("Catalog request to {source_name} failed: {reason}\nCheck your internet connection.")]
    CatalogRequest { source_name: String, reason: String },

    /// The catalog response body could not be parsed.
    #[error("Failed to parse {source_name} catalog response: {detail}")]
    CatalogParse { source_name: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A staging or output directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    WorkspaceSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed, or a nonsensical run was requested.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single paper record.
///
/// Stored in [`crate::report::RecordOutcome`] when a record fails. The
/// overall run continues with the remaining records.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RecordError {
    /// An artifact URL answered with a non-200 status.
    #[error("'{id}': fetch of {url} returned HTTP {status}")]
    FetchFailed { id: String, url: String, status: u16 },

    /// An artifact download timed out.
    #[error("'{id}': fetch of {url} timed out after {secs}s")]
    FetchTimeout { id: String, url: String, secs: u64 },

    /// Network-level failure before any HTTP status was received.
    #[error("'{id}': network error: {detail}")]
    Network { id: String, detail: String },

    /// The staged file is not a readable gzipped tarball.
    #[error("'{id}': failed to extract archive: {detail}")]
    BadArchive { id: String, detail: String },

    /// The extracted source tree contains no `.tex` file.
    #[error("'{id}': no .tex file found in extracted source")]
    NoTexSource { id: String },

    /// An external conversion tool exited non-zero (or could not be spawned).
    #[error("{tool} failed: {detail}")]
    ConverterFailed { tool: String, detail: String },

    /// Local file I/O failed for this record's artifacts.
    #[error("'{id}': I/O error: {detail}")]
    Io { id: String, detail: String },
}
