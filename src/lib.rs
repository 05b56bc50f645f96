//! # paper2html
//!
//! Fetch recently-published academic papers from arXiv and PLOS and convert
//! them to HTML via external document-conversion tools.
//!
//! ## Why this crate?
//!
//! Publisher PDFs are hostile to reflowing, search, and accessibility
//! tooling. Both arXiv and PLOS expose the machine-readable form of each
//! paper — LaTeX source tarballs and JATS manuscript XML respectively — so
//! instead of scraping PDFs this crate fetches those artifacts and runs them
//! through the standard converters (LaTeXML, pandoc), producing faithful
//! HTML alongside the original PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! arXiv                                PLOS
//!  │                                    │
//!  ├─ 1. Catalog  Atom query, newest N  ├─ 1. Catalog  Solr pages, newest N
//!  ├─ 2. Fetch    e-print tarballs      ├─ 2. Fetch    PDF + manuscript XML
//!  │              (concurrent, barrier) │              (sequential)
//!  ├─ 3. Extract  tar.gz → main .tex    │
//!  ├─ 4. Convert  latexml → latexmlpost ├─ 3. Convert  pandoc XML → HTML
//!  ├─ 5. PDF      saved on success      │
//!  └─ 6. Cleanup  staging removal       └─ 4. Cleanup  xml/ removal
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paper2html::{harvest_arxiv, HarvestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Requires latexml and latexmlpost on PATH.
//!     let config = HarvestConfig::builder().root_dir("./papers").build()?;
//!     let report = harvest_arxiv(10, &config).await?;
//!     println!(
//!         "{} of {} papers converted",
//!         report.stats.succeeded, report.stats.discovered
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `paper2html` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! paper2html = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! | Tool | Used for | Needed by |
//! |------|----------|-----------|
//! | `latexml`     | LaTeX → XML  | arXiv pipeline |
//! | `latexmlpost` | XML → HTML   | arXiv pipeline |
//! | `pandoc`      | JATS → HTML  | PLOS pipeline |
//!
//! None are validated up front: a missing tool surfaces as a per-record
//! conversion failure. Tests inject fake [`Converter`]s instead.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
pub mod config;
pub mod error;
pub mod harvest;
pub mod pipeline;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use catalog::PaperRecord;
pub use config::{DirLayout, HarvestConfig, HarvestConfigBuilder};
pub use error::{HarvestError, RecordError};
pub use harvest::{harvest_arxiv, harvest_plos};
pub use pipeline::convert::Converter;
pub use progress::{HarvestProgress, ProgressHook};
pub use report::{RecordOutcome, RunReport, RunStats, Stage};
