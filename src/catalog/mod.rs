//! Source enumerators: query a remote catalog for the N most recent papers.
//!
//! Both catalogs return the same lightweight [`PaperRecord`]; everything
//! downstream (fetch, convert, cleanup) is source-agnostic apart from the
//! artifact URL templates. Records are immutable and discarded at the end of
//! the run — there is no persistence or cross-run deduplication.
//!
//! 1. [`arxiv`] — single Atom query sorted by submission date, capped at N
//! 2. [`plos`]  — offset-paginated Solr queries with a growing batch size to
//!    compensate for filtered-out sub-document ids

pub mod arxiv;
pub mod plos;

use serde::{Deserialize, Serialize};

/// A single paper's metadata as returned by a catalog API.
///
/// `id` is the source-assigned identifier and drives all filenames, so at
/// most one staging artifact and one output pair exist per id per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    /// arXiv short id (e.g. `2301.07041v1`) or PLOS DOI
    /// (e.g. `10.1371/journal.pone.0303785`).
    pub id: String,
    /// Paper title, whitespace-normalised.
    pub title: String,
    /// Direct PDF URL when the catalog provides one. Always set for arXiv;
    /// `None` for PLOS, whose PDF is fetched from the article-file endpoint.
    pub pdf_url: Option<String>,
}

impl PaperRecord {
    /// File stem used for this record's staging and output artifacts.
    ///
    /// Old-style arXiv ids (`math.AG/0601001`) and PLOS DOIs contain `/`,
    /// which cannot appear in a single path component.
    pub fn file_stem(&self) -> String {
        self.id.replace(['/', '\\'], "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_flattens_path_separators() {
        let record = PaperRecord {
            id: "math.AG/0601001".into(),
            title: "t".into(),
            pdf_url: None,
        };
        assert_eq!(record.file_stem(), "math.AG_0601001");
    }

    #[test]
    fn file_stem_is_identity_for_new_style_ids() {
        let record = PaperRecord {
            id: "2301.07041v2".into(),
            title: "t".into(),
            pdf_url: None,
        };
        assert_eq!(record.file_stem(), "2301.07041v2");
    }
}
