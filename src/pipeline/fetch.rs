//! Artifact fetching: download per-record files over HTTP.
//!
//! A non-200 response is a *soft* failure: the record is skipped (logged by
//! the caller) and the run proceeds — no retry. Each record writes only under
//! paths keyed by its own id, so concurrent fetches need no locking;
//! collision is prevented by construction.

use crate::catalog::PaperRecord;
use crate::error::{HarvestError, RecordError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// PLOS article-file flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlosArtifact {
    /// The typeset PDF (`type=printable`).
    Pdf,
    /// The JATS manuscript XML (`type=manuscript`).
    ManuscriptXml,
}

impl PlosArtifact {
    fn query_value(self) -> &'static str {
        match self {
            PlosArtifact::Pdf => "printable",
            PlosArtifact::ManuscriptXml => "manuscript",
        }
    }
}

/// Build the shared HTTP client used for every download in a run.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, HarvestError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| HarvestError::Internal(format!("HTTP client: {e}")))
}

/// arXiv e-print URL for a record id.
pub fn arxiv_eprint_url(base: &str, id: &str) -> String {
    format!("{base}/{id}")
}

/// PLOS article-file URL for a record id and artifact flavour.
pub fn plos_file_url(base: &str, id: &str, artifact: PlosArtifact) -> String {
    format!("{base}?id={id}&type={}", artifact.query_value())
}

/// GET `url` and write the body to `dest`. HTTP 200 is the only success
/// signal; anything else fails the record.
pub async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    id: &str,
    timeout_secs: u64,
) -> Result<(), RecordError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            RecordError::FetchTimeout {
                id: id.to_string(),
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            RecordError::Network {
                id: id.to_string(),
                detail: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(RecordError::FetchFailed {
            id: id.to_string(),
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| RecordError::Network {
        id: id.to_string(),
        detail: e.to_string(),
    })?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| RecordError::Io {
            id: id.to_string(),
            detail: format!("writing {}: {e}", dest.display()),
        })?;

    debug!("fetched {url} → {} ({} bytes)", dest.display(), bytes.len());
    Ok(())
}

/// Fetch an arXiv e-print tarball into `source/{stem}.tar.gz`.
pub async fn fetch_arxiv_source(
    client: &reqwest::Client,
    eprint_base: &str,
    record: &PaperRecord,
    source_dir: &Path,
    timeout_secs: u64,
) -> Result<PathBuf, RecordError> {
    let url = arxiv_eprint_url(eprint_base, &record.id);
    let dest = source_dir.join(format!("{}.tar.gz", record.file_stem()));
    fetch_to_file(client, &url, &dest, &record.id, timeout_secs).await?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eprint_url_appends_id() {
        assert_eq!(
            arxiv_eprint_url("https://arxiv.org/e-print", "2301.07041v1"),
            "https://arxiv.org/e-print/2301.07041v1"
        );
    }

    #[test]
    fn plos_urls_carry_artifact_type() {
        let base = "https://journals.plos.org/plosone/article/file";
        assert_eq!(
            plos_file_url(base, "10.1371/journal.pone.0303785", PlosArtifact::Pdf),
            "https://journals.plos.org/plosone/article/file\
             ?id=10.1371/journal.pone.0303785&type=printable"
        );
        assert_eq!(
            plos_file_url(
                base,
                "10.1371/journal.pone.0303785",
                PlosArtifact::ManuscriptXml
            ),
            "https://journals.plos.org/plosone/article/file\
             ?id=10.1371/journal.pone.0303785&type=manuscript"
        );
    }

    #[tokio::test]
    async fn dropped_connection_is_a_network_error() {
        // Loopback listener that closes every connection without answering.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            while let Ok((stream, _)) = listener.accept() {
                drop(stream);
            }
        });

        let client = http_client(5).unwrap();
        let tmp = tempfile::TempDir::new().unwrap();
        let dest = tmp.path().join("out.bin");
        let err = fetch_to_file(&client, &format!("http://{addr}/x"), &dest, "id-1", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::Network { .. }), "got: {err}");
        assert!(!dest.exists(), "no staging artifact on failed fetch");
    }
}
