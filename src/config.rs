//! Configuration types for a harvest run.
//!
//! All run behaviour is controlled through [`HarvestConfig`], built via its
//! [`HarvestConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across tasks and to diff two runs to understand why their
//! outputs differ.
//!
//! # Design choice: explicit directory layout
//! The directory layout lives in [`DirLayout`] as resolved paths under one
//! root, passed to every pipeline stage. Relying on the process's current
//! directory (fixed relative `pdf/`, `html/`, … paths) would couple every
//! stage to where the binary happens to be launched from and make tests
//! race on shared state.

use crate::error::HarvestError;
use crate::pipeline::convert::Converter;
use crate::progress::ProgressHook;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default arXiv Atom search endpoint.
pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// Default arXiv e-print (source tarball) endpoint; the id is appended.
pub const ARXIV_EPRINT_URL: &str = "https://arxiv.org/e-print";

/// Default PLOS Solr search endpoint.
pub const PLOS_API_URL: &str = "https://api.plos.org/search";

/// Default PLOS article-file endpoint (PDF and manuscript XML).
pub const PLOS_FILE_URL: &str = "https://journals.plos.org/plosone/article/file";

/// Resolved directory layout for one harvest run.
///
/// Final outputs land in `pdf/` and `html/`. The remaining directories are
/// transient staging, removed (or deliberately left unused) by the cleanup
/// stage depending on the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirLayout {
    /// Root under which all other directories live. Stray `.log`/`.xml`
    /// files written here by the LaTeXML tools are removed during cleanup.
    pub root: PathBuf,
    /// Final PDF output.
    pub pdf: PathBuf,
    /// Final HTML output. Scrubbed of non-`.html` byproducts after a run.
    pub html: PathBuf,
    /// Raw arXiv e-print tarballs. Removed after a run.
    pub source: PathBuf,
    /// Extracted LaTeX source trees, one subdirectory per record. Removed
    /// after a run.
    pub extracted: PathBuf,
    /// Raw PLOS manuscript XML. Removed after a run.
    pub xml: PathBuf,
    /// Created for the PLOS pipeline but left unused by the current tools.
    pub outputs: PathBuf,
    /// Created for the PLOS pipeline but left unused by the current tools.
    pub figures: PathBuf,
}

impl DirLayout {
    /// Build the standard layout under `root`.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pdf: root.join("pdf"),
            html: root.join("html"),
            source: root.join("source"),
            extracted: root.join("extracted"),
            xml: root.join("xml"),
            outputs: root.join("outputs"),
            figures: root.join("figures"),
            root,
        }
    }

    /// Directories the arXiv pipeline needs before it starts.
    pub fn arxiv_dirs(&self) -> [&Path; 4] {
        [&self.pdf, &self.html, &self.source, &self.extracted]
    }

    /// Directories the PLOS pipeline needs before it starts.
    ///
    /// `outputs/` and `figures/` are created even though nothing writes to
    /// them; downstream tooling expects the full layout to exist.
    pub fn plos_dirs(&self) -> [&Path; 5] {
        [&self.pdf, &self.html, &self.xml, &self.outputs, &self.figures]
    }

    /// Create the given directories, erroring on the first failure.
    pub fn ensure(dirs: &[&Path]) -> Result<(), HarvestError> {
        for dir in dirs {
            std::fs::create_dir_all(dir).map_err(|e| HarvestError::WorkspaceSetup {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Configuration for a harvest run.
///
/// Built via [`HarvestConfig::builder()`] or using
/// [`HarvestConfig::default()`].
///
/// # Example
/// ```rust
/// use paper2html::HarvestConfig;
///
/// let config = HarvestConfig::builder()
///     .root_dir("/tmp/papers")
///     .fetch_concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct HarvestConfig {
    /// Directory layout for staging and output files.
    pub dirs: DirLayout,

    /// Number of concurrent artifact downloads in the arXiv fetch phase.
    /// Default: 16.
    ///
    /// Downloads are network-bound; fanning them out hides per-request
    /// latency. The fetch phase is a full barrier — conversion does not start
    /// until every download has completed or failed.
    pub fetch_concurrency: usize,

    /// Number of parallel conversion workers. Default: available CPU count.
    ///
    /// Conversion shells out to latexml/latexmlpost, which are CPU-bound;
    /// more workers than cores just thrash. Each worker owns its own
    /// `extracted/{id}` subdirectory, so no locking is needed.
    pub convert_workers: usize,

    /// Per-download HTTP timeout in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// arXiv Atom search endpoint.
    pub arxiv_api_url: String,

    /// arXiv e-print endpoint; `/{id}` is appended per record.
    pub arxiv_eprint_url: String,

    /// PLOS Solr search endpoint.
    pub plos_api_url: String,

    /// PLOS article-file endpoint; `?id={id}&type={kind}` is appended.
    pub plos_file_url: String,

    /// LaTeX → XML converter. Defaults to shelling out to `latexml`.
    /// Inject a fake in tests to avoid requiring the real binary.
    pub latex_to_xml: Option<Arc<dyn Converter>>,

    /// XML → HTML converter for the arXiv path. Defaults to `latexmlpost`.
    pub xml_to_html: Option<Arc<dyn Converter>>,

    /// Generic document converter for the PLOS path. Defaults to `pandoc`.
    pub document_converter: Option<Arc<dyn Converter>>,

    /// Optional per-record progress hook (drives the CLI progress bar).
    pub progress: Option<ProgressHook>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            dirs: DirLayout::rooted_at("."),
            fetch_concurrency: 16,
            convert_workers: default_workers(),
            download_timeout_secs: 120,
            arxiv_api_url: ARXIV_API_URL.to_string(),
            arxiv_eprint_url: ARXIV_EPRINT_URL.to_string(),
            plos_api_url: PLOS_API_URL.to_string(),
            plos_file_url: PLOS_FILE_URL.to_string(),
            latex_to_xml: None,
            xml_to_html: None,
            document_converter: None,
            progress: None,
        }
    }
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("dirs", &self.dirs)
            .field("fetch_concurrency", &self.fetch_concurrency)
            .field("convert_workers", &self.convert_workers)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("arxiv_api_url", &self.arxiv_api_url)
            .field("plos_api_url", &self.plos_api_url)
            .field(
                "latex_to_xml",
                &self.latex_to_xml.as_ref().map(|c| c.name()),
            )
            .field("xml_to_html", &self.xml_to_html.as_ref().map(|c| c.name()))
            .field(
                "document_converter",
                &self.document_converter.as_ref().map(|c| c.name()),
            )
            .finish()
    }
}

impl HarvestConfig {
    /// Create a new builder for `HarvestConfig`.
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder {
            config: Self::default(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Builder for [`HarvestConfig`].
#[derive(Debug)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Root all staging and output directories under `root`.
    pub fn root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.dirs = DirLayout::rooted_at(root);
        self
    }

    pub fn dirs(mut self, dirs: DirLayout) -> Self {
        self.config.dirs = dirs;
        self
    }

    pub fn fetch_concurrency(mut self, n: usize) -> Self {
        self.config.fetch_concurrency = n.max(1);
        self
    }

    pub fn convert_workers(mut self, n: usize) -> Self {
        self.config.convert_workers = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn arxiv_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.arxiv_api_url = url.into();
        self
    }

    pub fn arxiv_eprint_url(mut self, url: impl Into<String>) -> Self {
        self.config.arxiv_eprint_url = url.into();
        self
    }

    pub fn plos_api_url(mut self, url: impl Into<String>) -> Self {
        self.config.plos_api_url = url.into();
        self
    }

    pub fn plos_file_url(mut self, url: impl Into<String>) -> Self {
        self.config.plos_file_url = url.into();
        self
    }

    pub fn latex_to_xml(mut self, converter: Arc<dyn Converter>) -> Self {
        self.config.latex_to_xml = Some(converter);
        self
    }

    pub fn xml_to_html(mut self, converter: Arc<dyn Converter>) -> Self {
        self.config.xml_to_html = Some(converter);
        self
    }

    pub fn document_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.config.document_converter = Some(converter);
        self
    }

    pub fn progress(mut self, hook: ProgressHook) -> Self {
        self.config.progress = Some(hook);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<HarvestConfig, HarvestError> {
        let c = &self.config;
        if c.fetch_concurrency == 0 || c.convert_workers == 0 {
            return Err(HarvestError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(HarvestError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths_hang_off_root() {
        let layout = DirLayout::rooted_at("/work");
        assert_eq!(layout.pdf, PathBuf::from("/work/pdf"));
        assert_eq!(layout.html, PathBuf::from("/work/html"));
        assert_eq!(layout.extracted, PathBuf::from("/work/extracted"));
        assert_eq!(layout.root, PathBuf::from("/work"));
    }

    #[test]
    fn builder_clamps_concurrency_to_one() {
        let config = HarvestConfig::builder()
            .fetch_concurrency(0)
            .convert_workers(0)
            .build()
            .unwrap();
        assert_eq!(config.fetch_concurrency, 1);
        assert_eq!(config.convert_workers, 1);
    }

    #[test]
    fn default_endpoints_are_production() {
        let config = HarvestConfig::default();
        assert!(config.arxiv_api_url.contains("export.arxiv.org"));
        assert!(config.plos_api_url.contains("api.plos.org"));
    }

    #[test]
    fn ensure_creates_nested_dirs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = DirLayout::rooted_at(tmp.path());
        DirLayout::ensure(&layout.arxiv_dirs()).unwrap();
        assert!(layout.source.is_dir());
        assert!(layout.extracted.is_dir());
    }
}
