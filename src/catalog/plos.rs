//! PLOS catalog client (Solr search API).
//!
//! PLOS indexes sub-documents (title, abstract, references, body) as separate
//! Solr documents alongside the article itself, so a page of `rows` results
//! can contain fewer than `rows` actual articles. Enumeration therefore
//! paginates with an explicit offset and grows the batch size to
//! `max(10, remaining)` until N articles are collected or a page comes back
//! empty (catalog exhausted — an early stop, not an error).

use crate::catalog::PaperRecord;
use crate::error::HarvestError;
use serde::Deserialize;
use tracing::{debug, info};

/// Suffix markers that identify a Solr sub-document rather than an article.
const SUB_DOCUMENT_MARKERS: [&str; 4] = ["/title", "/abstract", "/references", "/body"];

/// Client for the PLOS search API.
pub struct PlosCatalog {
    client: reqwest::Client,
    api_url: String,
}

impl PlosCatalog {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// Return the `count` most recently published articles, newest first.
    ///
    /// Sub-document ids and articles without a title are skipped and never
    /// count toward `count`.
    pub async fn recent(&self, count: usize) -> Result<Vec<PaperRecord>, HarvestError> {
        collect_articles(self, count).await
    }
}

/// One page of raw Solr docs, addressed by offset.
///
/// [`PlosCatalog`] is the HTTP implementation; tests drive the enumeration
/// loop with canned pages instead.
trait PageSource {
    async fn page(&self, start: usize, rows: usize) -> Result<Vec<Doc>, HarvestError>;
}

impl PageSource for PlosCatalog {
    async fn page(&self, start: usize, rows: usize) -> Result<Vec<Doc>, HarvestError> {
        debug!("querying PLOS catalog: start={start} rows={rows}");
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", "*:*"),
                ("start", &start.to_string()),
                ("rows", &rows.to_string()),
                ("fl", "id,title"),
                ("wt", "json"),
                ("sort", "publication_date desc"),
            ])
            .send()
            .await
            .map_err(|e| HarvestError::CatalogRequest {
                source_name: "plos".into(),
                reason: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(HarvestError::CatalogRequest {
                source_name: "plos".into(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let body: SearchBody =
            response
                .json()
                .await
                .map_err(|e| HarvestError::CatalogParse {
                    source_name: "plos".into(),
                    detail: e.to_string(),
                })?;
        Ok(body.response.docs)
    }
}

/// Paginate through `pages` until `count` articles are collected or a page
/// comes back empty.
async fn collect_articles<P: PageSource>(
    pages: &P,
    count: usize,
) -> Result<Vec<PaperRecord>, HarvestError> {
    let mut records: Vec<PaperRecord> = Vec::with_capacity(count);
    let mut start = 0usize;

    while records.len() < count {
        let rows = next_batch_size(count, records.len());
        let docs = pages.page(start, rows).await?;
        if docs.is_empty() {
            info!(
                "PLOS catalog exhausted after {} of {} records",
                records.len(),
                count
            );
            break;
        }
        start += docs.len();

        for doc in docs {
            if is_sub_document(&doc.id) || doc.title.is_empty() {
                continue;
            }
            records.push(PaperRecord {
                id: doc.id,
                title: doc.title,
                pdf_url: None,
            });
            if records.len() == count {
                break;
            }
        }
    }

    Ok(records)
}

/// Batch size for the next page: at least 10, or everything still missing.
fn next_batch_size(count: usize, have: usize) -> usize {
    count.saturating_sub(have).max(10)
}

/// Whether a Solr id names a sub-document of an article.
pub fn is_sub_document(id: &str) -> bool {
    SUB_DOCUMENT_MARKERS.iter().any(|m| id.contains(m))
}

/// File stem derived from an article title: path separators and spaces
/// become underscores so the title can name a file.
pub fn sanitized_file_stem(title: &str) -> String {
    title.replace([' ', '/', '\\'], "_")
}

// ── Raw Solr response model ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchBody {
    response: SearchResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    docs: Vec<Doc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Doc {
    id: String,
    /// Absent on some sub-documents; empty means "skip this doc".
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves slices of a fixed doc list, exactly like a Solr offset query.
    struct CannedPages {
        docs: Vec<Doc>,
    }

    impl PageSource for CannedPages {
        async fn page(&self, start: usize, rows: usize) -> Result<Vec<Doc>, HarvestError> {
            Ok(self.docs.iter().skip(start).take(rows).cloned().collect())
        }
    }

    fn article(n: usize) -> Doc {
        Doc {
            id: format!("10.1371/journal.pone.{n:07}"),
            title: format!("Article {n}"),
        }
    }

    fn sub_doc(n: usize, part: &str) -> Doc {
        Doc {
            id: format!("10.1371/journal.pone.{n:07}/{part}"),
            title: format!("Article {n}"),
        }
    }

    #[tokio::test]
    async fn returns_at_most_n_even_with_a_surplus_page() {
        let pages = CannedPages {
            docs: (0..25).map(article).collect(),
        };
        let records = collect_articles(&pages, 3).await.unwrap();
        assert_eq!(records.len(), 3);
        // Newest-first order from the source is preserved.
        assert_eq!(records[0].id, "10.1371/journal.pone.0000000");
        assert_eq!(records[2].id, "10.1371/journal.pone.0000002");
    }

    #[tokio::test]
    async fn sub_document_heavy_pages_are_compensated_by_pagination() {
        // Each article is followed by its four sub-documents, so a 10-row
        // page yields only two articles and the loop must keep paginating.
        let mut docs = Vec::new();
        for n in 0..6 {
            docs.push(article(n));
            for part in ["title", "abstract", "references", "body"] {
                docs.push(sub_doc(n, part));
            }
        }
        let pages = CannedPages { docs };

        let records = collect_articles(&pages, 5).await.unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| !is_sub_document(&r.id)));
        assert!(records.iter().all(|r| !r.title.is_empty()));
    }

    #[tokio::test]
    async fn exhausted_catalog_stops_early_without_error() {
        let pages = CannedPages {
            docs: (0..12).map(article).collect(),
        };
        let records = collect_articles(&pages, 50).await.unwrap();
        assert_eq!(records.len(), 12);
    }

    #[tokio::test]
    async fn untitled_docs_are_skipped() {
        let mut docs = vec![article(1)];
        docs.push(Doc {
            id: "10.1371/journal.pone.9999999".into(),
            title: String::new(),
        });
        docs.push(article(2));
        let pages = CannedPages { docs };

        let records = collect_articles(&pages, 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "10.1371/journal.pone.0000002");
    }

    #[test]
    fn sub_document_ids_are_detected() {
        assert!(is_sub_document("10.1371/journal.pone.0303785/title"));
        assert!(is_sub_document("10.1371/journal.pone.0303785/abstract"));
        assert!(is_sub_document("10.1371/journal.pone.0303785/references"));
        assert!(is_sub_document("10.1371/journal.pone.0303785/body"));
        assert!(!is_sub_document("10.1371/journal.pone.0303785"));
    }

    #[test]
    fn titles_become_safe_file_stems() {
        assert_eq!(
            sanitized_file_stem("Protein folding in vivo/vitro"),
            "Protein_folding_in_vivo_vitro"
        );
        assert_eq!(sanitized_file_stem(r"a\b c"), "a_b_c");
    }

    #[test]
    fn batch_size_is_at_least_ten() {
        assert_eq!(next_batch_size(3, 0), 10);
        assert_eq!(next_batch_size(50, 0), 50);
        assert_eq!(next_batch_size(50, 45), 10);
        assert_eq!(next_batch_size(50, 25), 25);
    }

    #[test]
    fn solr_body_parses_and_tolerates_missing_titles() {
        let json = r#"{
            "response": {
                "numFound": 12345,
                "docs": [
                    {"id": "10.1371/journal.pone.0000001", "title": "First"},
                    {"id": "10.1371/journal.pone.0000001/title"},
                    {"id": "10.1371/journal.pone.0000002", "title": "Second"}
                ]
            }
        }"#;
        let body: SearchBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.response.docs.len(), 3);
        assert!(body.response.docs[1].title.is_empty());
        assert_eq!(body.response.docs[2].title, "Second");
    }
}
