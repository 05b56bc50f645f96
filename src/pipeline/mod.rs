//! Pipeline stages for paper harvesting.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a fake converter in tests) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! catalog ──▶ fetch ──▶ extract ──▶ convert ──▶ cleanup
//! (records)   (HTTP)    (tar.gz)   (latexml/    (staging
//!                                   pandoc)      removal)
//! ```
//!
//! 1. [`fetch`]   — download tarballs / PDFs / manuscript XML; the only
//!    stage with network I/O
//! 2. [`extract`] — unpack the e-print tarball and pick the main `.tex`
//!    file; runs in `spawn_blocking` because archive I/O is synchronous
//! 3. [`convert`] — drive the external conversion tools behind the
//!    [`convert::Converter`] capability trait
//! 4. [`cleanup`] — best-effort removal of staging directories and
//!    conversion byproducts

pub mod cleanup;
pub mod convert;
pub mod extract;
pub mod fetch;
