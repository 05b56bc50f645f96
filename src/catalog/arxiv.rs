//! arXiv catalog client (Atom feed).
//!
//! arXiv exposes an Atom API at `https://export.arxiv.org/api/query`; one
//! query sorted by submission date with `max_results=N` is enough — no
//! pagination. We use quick-xml's serde support because Atom's repeated
//! `<entry>`/`<link>` elements map cleanly onto `Vec` fields, and namespaced
//! XML makes hand-rolled parsing brittle.

use crate::catalog::PaperRecord;
use crate::error::HarvestError;
use serde::Deserialize;
use tracing::{debug, warn};

/// Client for the arXiv search API.
pub struct ArxivCatalog {
    client: reqwest::Client,
    api_url: String,
}

impl ArxivCatalog {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    fn query_url(&self, count: usize) -> String {
        format!(
            "{}?search_query=all&sortBy=submittedDate&sortOrder=descending&max_results={}",
            self.api_url, count
        )
    }

    /// Return the `count` most recently submitted papers, newest first.
    ///
    /// Fewer than `count` records are returned only when the feed itself
    /// contains fewer entries.
    pub async fn recent(&self, count: usize) -> Result<Vec<PaperRecord>, HarvestError> {
        let url = self.query_url(count);
        debug!("querying arXiv catalog: {url}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            HarvestError::CatalogRequest {
                source_name: "arxiv".into(),
                reason: e.to_string(),
            }
        })?;
        if !response.status().is_success() {
            return Err(HarvestError::CatalogRequest {
                source_name: "arxiv".into(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|e| HarvestError::CatalogRequest {
                source_name: "arxiv".into(),
                reason: e.to_string(),
            })?;

        parse_recent(&body, count)
    }
}

/// Parse an Atom feed body and cap the result at `count` records; the feed
/// can carry more entries than asked for.
pub(crate) fn parse_recent(xml: &str, count: usize) -> Result<Vec<PaperRecord>, HarvestError> {
    let mut records = parse_feed(xml)?;
    records.truncate(count);
    Ok(records)
}

/// Parse an Atom feed body into records.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<PaperRecord>, HarvestError> {
    let feed: Feed =
        quick_xml::de::from_str(xml).map_err(|e| HarvestError::CatalogParse {
            source_name: "arxiv".into(),
            detail: e.to_string(),
        })?;

    let records = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let Some(id) = short_id(&entry.id) else {
                warn!("skipping arXiv entry with unrecognised id: {}", entry.id);
                return None;
            };
            let pdf_url = entry
                .links
                .iter()
                .find(|l| l.kind.as_deref() == Some("application/pdf"))
                .map(|l| l.href.clone())
                .or_else(|| Some(format!("https://arxiv.org/pdf/{id}")));
            Some(PaperRecord {
                title: normalize_ws(&entry.title),
                id,
                pdf_url,
            })
        })
        .collect();
    Ok(records)
}

/// Extract the short id from an entry id URL like
/// `http://arxiv.org/abs/2301.07041v1` (version suffix retained — the
/// e-print endpoint accepts versioned ids).
fn short_id(entry_id_url: &str) -> Option<String> {
    let i = entry_id_url.rfind("/abs/")?;
    let tail = entry_id_url[i + "/abs/".len()..].trim_matches('/').trim();
    (!tail.is_empty()).then(|| tail.to_string())
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Raw Atom model ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Feed {
    #[serde(rename = "entry")]
    entries: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    /// arXiv abs URL, e.g. `http://arxiv.org/abs/2301.07041v1`.
    id: String,
    /// May contain embedded newlines and LaTeX markup.
    title: String,
    #[serde(rename = "link")]
    links: Vec<Link>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Link {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@type")]
    kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=all</title>
  <entry>
    <id>http://arxiv.org/abs/2301.07041v1</id>
    <title>Attention Is
      All You Need, Again</title>
    <link href="http://arxiv.org/abs/2301.07041v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2301.07041v1" rel="related" type="application/pdf"/>
    <author><name>A. Author</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/math.AG/0601001v2</id>
    <title>On Schemes</title>
    <link href="http://arxiv.org/abs/math.AG/0601001v2" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_with_pdf_links() {
        let records = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "2301.07041v1");
        assert_eq!(records[0].title, "Attention Is All You Need, Again");
        assert_eq!(
            records[0].pdf_url.as_deref(),
            Some("http://arxiv.org/pdf/2301.07041v1")
        );
    }

    #[test]
    fn synthesizes_pdf_url_when_feed_lacks_a_pdf_link() {
        let records = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(records[1].id, "math.AG/0601001v2");
        assert_eq!(
            records[1].pdf_url.as_deref(),
            Some("https://arxiv.org/pdf/math.AG/0601001v2")
        );
    }

    #[test]
    fn oversized_feed_is_capped_at_the_requested_count() {
        let records = parse_recent(SAMPLE_FEED, 1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "2301.07041v1");
        // Asking for more than the feed holds returns everything it has.
        assert_eq!(parse_recent(SAMPLE_FEED, 99).unwrap().len(), 2);
    }

    #[test]
    fn empty_feed_yields_no_records() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn garbage_body_is_a_parse_error() {
        let err = parse_feed("{\"not\": \"xml\"}").unwrap_err();
        assert!(matches!(err, HarvestError::CatalogParse { .. }));
    }

    #[test]
    fn short_id_handles_both_id_styles() {
        assert_eq!(
            short_id("http://arxiv.org/abs/2301.07041v1").as_deref(),
            Some("2301.07041v1")
        );
        assert_eq!(
            short_id("https://arxiv.org/abs/math.AG/0601001").as_deref(),
            Some("math.AG/0601001")
        );
        assert_eq!(short_id("https://arxiv.org/pdf/2301.07041"), None);
    }

    #[test]
    fn query_url_is_sorted_newest_first() {
        let catalog = ArxivCatalog::new(
            reqwest::Client::new(),
            "https://export.arxiv.org/api/query",
        );
        let url = catalog.query_url(25);
        assert!(url.contains("sortBy=submittedDate"));
        assert!(url.contains("sortOrder=descending"));
        assert!(url.ends_with("max_results=25"));
    }
}
