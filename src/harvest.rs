//! Harvest orchestration: the top-level entry points.
//!
//! Two pipelines share the Enumerate → Fetch → Convert → Cleanup shape but
//! differ in scheduling:
//!
//! * **arXiv** — all per-record downloads run concurrently; a full barrier
//!   separates the fetch phase from conversion (no streaming overlap). The
//!   conversion phase fans out across a bounded worker pool sized to the CPU
//!   count, one record per task; each task owns its own `extracted/{id}`
//!   subdirectory, so workers share no mutable state and results are
//!   collected from the stream rather than through a shared array.
//!
//! * **PLOS** — fully sequential: one record's fetch-then-convert completes
//!   before the next begins.
//!
//! Records never interact; there are no ordering guarantees across records
//! and output order is not meaningful.

use crate::catalog::arxiv::ArxivCatalog;
use crate::catalog::plos::{self, PlosCatalog};
use crate::catalog::PaperRecord;
use crate::config::{DirLayout, HarvestConfig};
use crate::error::{HarvestError, RecordError};
use crate::pipeline::convert::{
    Converter, LatexmlConverter, LatexmlPostConverter, PandocConverter,
};
use crate::pipeline::{cleanup, extract, fetch};
use crate::report::{RecordOutcome, RunReport, Stage};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Harvest the `count` most recently submitted arXiv papers.
///
/// For each paper: fetch the e-print tarball, extract it, convert the main
/// `.tex` file to XML (latexml) and on to HTML (latexmlpost), and only then
/// save the PDF. Per-record failures are logged, recorded in the report, and
/// skipped; the run fails only on catalog or workspace errors.
pub async fn harvest_arxiv(
    count: usize,
    config: &HarvestConfig,
) -> Result<RunReport, HarvestError> {
    if count == 0 {
        return Err(HarvestError::InvalidConfig(
            "Number of papers must be ≥ 1".into(),
        ));
    }
    let total_start = Instant::now();
    DirLayout::ensure(&config.dirs.arxiv_dirs())?;

    let client = fetch::http_client(config.download_timeout_secs)?;

    // ── Enumerate ────────────────────────────────────────────────────────
    let catalog = ArxivCatalog::new(client.clone(), config.arxiv_api_url.clone());
    let records = catalog.recent(count).await?;
    let discovered = records.len();
    info!("arXiv catalog returned {discovered} of {count} requested records");
    if let Some(hook) = &config.progress {
        hook.on_run_start(discovered);
    }

    // ── Fetch (concurrent, full barrier) ─────────────────────────────────
    let fetch_start = Instant::now();
    let fetched: Vec<(PaperRecord, Result<PathBuf, RecordError>)> =
        stream::iter(records.into_iter().map(|record| {
            let client = client.clone();
            let eprint_base = config.arxiv_eprint_url.clone();
            let source_dir = config.dirs.source.clone();
            let timeout = config.download_timeout_secs;
            async move {
                let staged = fetch::fetch_arxiv_source(
                    &client,
                    &eprint_base,
                    &record,
                    &source_dir,
                    timeout,
                )
                .await;
                (record, staged)
            }
        }))
        .buffer_unordered(config.fetch_concurrency)
        .collect()
        .await;
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
    info!("fetched {} e-prints in {fetch_duration_ms}ms", fetched.len());

    // ── Convert (bounded worker pool) ────────────────────────────────────
    let latexml = config
        .latex_to_xml
        .clone()
        .unwrap_or_else(|| Arc::new(LatexmlConverter) as Arc<dyn Converter>);
    let latexmlpost = config
        .xml_to_html
        .clone()
        .unwrap_or_else(|| Arc::new(LatexmlPostConverter) as Arc<dyn Converter>);

    let convert_start = Instant::now();
    let total = fetched.len();
    let done = Arc::new(AtomicUsize::new(0));
    let outcomes: Vec<RecordOutcome> = stream::iter(fetched.into_iter().map(|(record, staged)| {
        let client = client.clone();
        let latexml = Arc::clone(&latexml);
        let latexmlpost = Arc::clone(&latexmlpost);
        let dirs = config.dirs.clone();
        let timeout = config.download_timeout_secs;
        let progress = config.progress.clone();
        let done = Arc::clone(&done);
        async move {
            let outcome = process_arxiv_record(
                record,
                staged,
                &client,
                latexml,
                latexmlpost,
                &dirs,
                timeout,
            )
            .await;
            if let Some(error) = &outcome.error {
                warn!("{error} — skipping '{}'", outcome.title);
            }
            if let Some(hook) = &progress {
                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                hook.on_record_complete(&outcome, n, total);
            }
            outcome
        }
    }))
    .buffer_unordered(config.convert_workers)
    .collect()
    .await;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

    // ── Cleanup ──────────────────────────────────────────────────────────
    cleanup::remove_staging_dirs(&[&config.dirs.extracted, &config.dirs.source]);
    cleanup::scrub_html_dir(&config.dirs.html);
    cleanup::remove_stray_tool_files(&config.dirs.root);

    let report = RunReport::new(
        count,
        discovered,
        outcomes,
        fetch_duration_ms,
        convert_duration_ms,
        total_start.elapsed().as_millis() as u64,
    );
    info!(
        "arXiv run complete: {}/{} records succeeded in {}ms",
        report.stats.succeeded, report.stats.discovered, report.stats.total_duration_ms
    );
    if let Some(hook) = &config.progress {
        hook.on_run_complete(&report.stats);
    }
    Ok(report)
}

/// Harvest the `count` most recently published PLOS articles.
///
/// For each article: fetch the PDF and the JATS manuscript XML (each with its
/// own pass/fail outcome), then convert the XML to HTML with the generic
/// document converter. Fetch and conversion interleave per record, so the
/// report attributes the whole sequential loop to `convert_duration_ms`.
pub async fn harvest_plos(
    count: usize,
    config: &HarvestConfig,
) -> Result<RunReport, HarvestError> {
    if count == 0 {
        return Err(HarvestError::InvalidConfig(
            "Number of papers must be ≥ 1".into(),
        ));
    }
    let total_start = Instant::now();
    DirLayout::ensure(&config.dirs.plos_dirs())?;

    let client = fetch::http_client(config.download_timeout_secs)?;

    // ── Enumerate ────────────────────────────────────────────────────────
    let catalog = PlosCatalog::new(client.clone(), config.plos_api_url.clone());
    let records = catalog.recent(count).await?;
    let discovered = records.len();
    info!("PLOS catalog returned {discovered} of {count} requested records");
    if let Some(hook) = &config.progress {
        hook.on_run_start(discovered);
    }

    let pandoc = config
        .document_converter
        .clone()
        .unwrap_or_else(|| Arc::new(PandocConverter) as Arc<dyn Converter>);

    // ── Fetch + convert (sequential) ─────────────────────────────────────
    let loop_start = Instant::now();
    let total = records.len();
    let mut outcomes = Vec::with_capacity(total);
    for (i, record) in records.into_iter().enumerate() {
        let outcome = process_plos_record(
            record,
            &client,
            Arc::clone(&pandoc),
            &config.dirs,
            &config.plos_file_url,
            config.download_timeout_secs,
        )
        .await;
        if let Some(error) = &outcome.error {
            warn!("{error} — skipping '{}'", outcome.title);
        }
        if let Some(hook) = &config.progress {
            hook.on_record_complete(&outcome, i + 1, total);
        }
        outcomes.push(outcome);
    }
    let convert_duration_ms = loop_start.elapsed().as_millis() as u64;

    // ── Cleanup ──────────────────────────────────────────────────────────
    cleanup::remove_staging_dirs(&[&config.dirs.xml]);

    let report = RunReport::new(
        count,
        discovered,
        outcomes,
        0,
        convert_duration_ms,
        total_start.elapsed().as_millis() as u64,
    );
    info!(
        "PLOS run complete: {}/{} records succeeded in {}ms",
        report.stats.succeeded, report.stats.discovered, report.stats.total_duration_ms
    );
    if let Some(hook) = &config.progress {
        hook.on_run_complete(&report.stats);
    }
    Ok(report)
}

// ── Per-record processing ────────────────────────────────────────────────

/// Extract, convert, and (on success) save the PDF for one arXiv record.
async fn process_arxiv_record(
    record: PaperRecord,
    staged: Result<PathBuf, RecordError>,
    client: &reqwest::Client,
    latexml: Arc<dyn Converter>,
    latexmlpost: Arc<dyn Converter>,
    dirs: &DirLayout,
    timeout_secs: u64,
) -> RecordOutcome {
    let start = Instant::now();
    let stem = record.file_stem();
    let PaperRecord { id, title, pdf_url } = record;

    let tarball = match staged {
        Ok(path) => path,
        Err(e) => return RecordOutcome::failed(id, title, Stage::Discovered, e, ms(start)),
    };

    // Extraction is blocking archive I/O; keep it off the async executor.
    let extraction_dir = dirs.extracted.join(&stem);
    let tex = {
        let id = id.clone();
        let extraction_dir = extraction_dir.clone();
        tokio::task::spawn_blocking(move || {
            extract::extract_tarball(&tarball, &extraction_dir, &id)?;
            extract::find_main_tex(&extraction_dir, &id)
        })
        .await
    };
    let tex = match tex {
        Ok(Ok(tex)) => tex,
        Ok(Err(e)) => return RecordOutcome::failed(id, title, Stage::Fetched, e, ms(start)),
        Err(e) => {
            let error = RecordError::Io {
                id: id.clone(),
                detail: format!("extraction task failed: {e}"),
            };
            return RecordOutcome::failed(id, title, Stage::Fetched, error, ms(start));
        }
    };

    // Intermediate XML goes in the staging root, where the stray-file sweep
    // will pick it up even if latexmlpost never runs.
    let xml_path = dirs.root.join(format!("{stem}.xml"));
    if let Err(e) = run_converter(latexml, tex, xml_path.clone()).await {
        return RecordOutcome::failed(id, title, Stage::Extracted, e, ms(start));
    }

    let html_path = dirs.html.join(format!("{stem}.html"));
    if let Err(e) = run_converter(latexmlpost, xml_path, html_path).await {
        return RecordOutcome::failed(id, title, Stage::ConvertedXml, e, ms(start));
    }

    // PDF is saved only after both conversion stages succeeded.
    match pdf_url {
        Some(url) => {
            let pdf_path = dirs.pdf.join(format!("{stem}.pdf"));
            if let Err(e) = fetch::fetch_to_file(client, &url, &pdf_path, &id, timeout_secs).await {
                return RecordOutcome::failed(id, title, Stage::ConvertedHtml, e, ms(start));
            }
            info!("saved PDF for '{title}'");
            RecordOutcome {
                id,
                title,
                stage: Stage::PdfSaved,
                error: None,
                duration_ms: ms(start),
            }
        }
        None => {
            warn!("'{id}': catalog entry had no PDF URL; HTML only");
            RecordOutcome {
                id,
                title,
                stage: Stage::ConvertedHtml,
                error: None,
                duration_ms: ms(start),
            }
        }
    }
}

/// Fetch PDF + manuscript XML and convert the XML for one PLOS record.
async fn process_plos_record(
    record: PaperRecord,
    client: &reqwest::Client,
    document_converter: Arc<dyn Converter>,
    dirs: &DirLayout,
    file_base: &str,
    timeout_secs: u64,
) -> RecordOutcome {
    let start = Instant::now();
    let stem = plos::sanitized_file_stem(&record.title);
    let PaperRecord { id, title, .. } = record;

    // PDF fetch has its own pass/fail outcome; a miss does not stop the XML
    // path for this record.
    let pdf_url = fetch::plos_file_url(file_base, &id, fetch::PlosArtifact::Pdf);
    let pdf_path = dirs.pdf.join(format!("{stem}.pdf"));
    let pdf_saved =
        match fetch::fetch_to_file(client, &pdf_url, &pdf_path, &id, timeout_secs).await {
            Ok(()) => {
                info!("downloaded PDF: {}", pdf_path.display());
                true
            }
            Err(e) => {
                warn!("{e} — no PDF for '{title}'");
                false
            }
        };

    let xml_url = fetch::plos_file_url(file_base, &id, fetch::PlosArtifact::ManuscriptXml);
    let xml_path = dirs.xml.join(format!("{stem}.xml"));
    if let Err(e) = fetch::fetch_to_file(client, &xml_url, &xml_path, &id, timeout_secs).await {
        return RecordOutcome::failed(id, title, Stage::Discovered, e, ms(start));
    }

    let html_path = dirs.html.join(format!("{stem}.html"));
    if let Err(e) = run_converter(document_converter, xml_path, html_path).await {
        return RecordOutcome::failed(id, title, Stage::Fetched, e, ms(start));
    }

    RecordOutcome {
        id,
        title,
        stage: if pdf_saved {
            Stage::PdfSaved
        } else {
            Stage::ConvertedHtml
        },
        error: None,
        duration_ms: ms(start),
    }
}

/// Run a synchronous converter on the blocking pool.
async fn run_converter(
    converter: Arc<dyn Converter>,
    input: PathBuf,
    output: PathBuf,
) -> Result<(), RecordError> {
    let tool = converter.name().to_string();
    tokio::task::spawn_blocking(move || converter.convert(&input, &output))
        .await
        .map_err(|e| RecordError::ConverterFailed {
            tool,
            detail: format!("conversion task failed: {e}"),
        })?
}

fn ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
