//! CLI binary for paper2html.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `HarvestConfig` and prints a run summary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use paper2html::{
    harvest_arxiv, harvest_plos, HarvestConfig, HarvestProgress, ProgressHook, RecordOutcome,
    RunReport, RunStats,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress hook using indicatif ────────────────────────────────────────

/// Terminal progress: a live bar plus one log line per finished record.
/// Records complete out of order in the concurrent arXiv pipeline.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Querying");
        bar.set_message("contacting catalog…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl HarvestProgress for CliProgress {
    fn on_run_start(&self, total_records: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} papers  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_records as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Harvesting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_records} papers…"))
        ));
    }

    fn on_record_complete(&self, outcome: &RecordOutcome, _done: usize, total: usize) {
        let line = match &outcome.error {
            None => format!(
                "  {} {:<24}  {}  {}",
                green("✓"),
                outcome.id,
                dim(&truncate(&outcome.title, 48)),
                dim(&format!("{:.1}s", outcome.duration_ms as f64 / 1000.0)),
            ),
            Some(error) => format!(
                "  {} {:<24}  {}",
                red("✗"),
                outcome.id,
                red(&truncate(&error.to_string(), 80)),
            ),
        };
        let _ = total;
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_run_complete(&self, stats: &RunStats) {
        self.bar.finish_and_clear();
        if stats.failed == 0 {
            eprintln!(
                "{} {} papers converted successfully",
                green("✔"),
                bold(&stats.succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} papers converted  ({} failed)",
                if stats.succeeded == 0 {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&stats.succeeded.to_string()),
                stats.discovered,
                red(&stats.failed.to_string()),
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Fetch and convert the 10 newest arXiv papers into ./pdf and ./html
  paper2html arxiv 10

  # Same for PLOS, into an explicit working directory
  paper2html --root-dir ./plos-papers plos 5

  # Machine-readable run report
  paper2html --json arxiv 3 > report.json

EXTERNAL TOOLS (must be on PATH):
  latexml / latexmlpost   arXiv pipeline (LaTeX → XML → HTML)
  pandoc                  PLOS pipeline (manuscript XML → HTML)

OUTPUT LAYOUT (under --root-dir):
  pdf/    final PDFs
  html/   final HTML, one file per paper
  source/ extracted/ xml/   transient staging, removed after the run

A paper that fails (404 on its artifact, corrupt tarball, converter error)
is logged and skipped; the run continues with the remaining papers.
"#;

/// Fetch recent arXiv/PLOS papers and convert them to HTML.
#[derive(Parser, Debug)]
#[command(
    name = "paper2html",
    version,
    about = "Fetch recent arXiv and PLOS papers and convert them to HTML",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    source: Source,

    /// Working directory for staging and output.
    #[arg(long, env = "PAPER2HTML_ROOT", default_value = ".")]
    root_dir: PathBuf,

    /// Concurrent artifact downloads (arXiv fetch phase).
    #[arg(long, env = "PAPER2HTML_FETCH_CONCURRENCY", default_value_t = 16)]
    fetch_concurrency: usize,

    /// Parallel conversion workers. Defaults to the CPU count.
    #[arg(long, env = "PAPER2HTML_WORKERS")]
    workers: Option<usize>,

    /// Per-download HTTP timeout in seconds.
    #[arg(long, env = "PAPER2HTML_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the run report as JSON instead of a summary.
    #[arg(long, env = "PAPER2HTML_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PAPER2HTML_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAPER2HTML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAPER2HTML_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Source {
    /// Harvest the N most recently submitted arXiv papers.
    Arxiv {
        /// Number of papers to download and process.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
    },
    /// Harvest the N most recently published PLOS articles.
    Plos {
        /// Number of papers to download and process.
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the feedback that matters; suppress
    // INFO-level library logs while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = HarvestConfig::builder()
        .root_dir(&cli.root_dir)
        .fetch_concurrency(cli.fetch_concurrency)
        .download_timeout_secs(cli.download_timeout);
    if let Some(workers) = cli.workers {
        builder = builder.convert_workers(workers);
    }
    if show_progress {
        let hook: ProgressHook = CliProgress::new();
        builder = builder.progress(hook);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let report = match &cli.source {
        Source::Arxiv { count } => harvest_arxiv(*count as usize, &config)
            .await
            .context("arXiv harvest failed")?,
        Source::Plos { count } => harvest_plos(*count as usize, &config)
            .await
            .context("PLOS harvest failed")?,
    };

    print_report(&report, &cli)?;

    Ok(())
}

fn print_report(report: &RunReport, cli: &Cli) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    // The progress hook already printed per-record lines and the final tick;
    // repeat the failures only when it was disabled.
    let progress_was_shown = !cli.quiet && !cli.no_progress && !cli.json;
    if !cli.quiet && !progress_was_shown {
        for outcome in report.records.iter().filter(|r| !r.succeeded()) {
            if let Some(error) = &outcome.error {
                eprintln!("  {} {}: {}", red("✗"), outcome.id, error);
            }
        }
    }
    if !cli.quiet {
        eprintln!(
            "{}  {}/{} papers  {}ms  →  {}",
            if report.stats.failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            report.stats.succeeded,
            report.stats.discovered,
            report.stats.total_duration_ms,
            bold(&cli.root_dir.display().to_string()),
        );
    }
    Ok(())
}
