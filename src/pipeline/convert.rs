//! External conversion tools behind a narrow capability trait.
//!
//! The core pipeline never spawns processes directly; it sees only
//! [`Converter`] — `convert(input, output)` with a zero-exit-code success
//! signal and captured stderr on failure. That keeps the orchestration logic
//! testable without latexml or pandoc installed: tests inject fakes through
//! [`crate::config::HarvestConfig`].
//!
//! Implementations are synchronous (the external process *is* the work) and
//! are run inside `spawn_blocking` by the conversion worker pool.

use crate::error::RecordError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// A document conversion capability: one input file to one output file.
pub trait Converter: Send + Sync {
    /// Tool name used in logs and error messages.
    fn name(&self) -> &str;

    /// Convert `input` into `output`. A non-zero exit status fails the
    /// record with the tool's stderr attached.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), RecordError>;
}

/// `latexml {input} --destination={output}` — LaTeX source to LaTeXML XML.
pub struct LatexmlConverter;

impl Converter for LatexmlConverter {
    fn name(&self) -> &str {
        "latexml"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), RecordError> {
        let mut destination = OsString::from("--destination=");
        destination.push(output);
        run_tool("latexml", &[input.as_os_str().to_owned(), destination])
    }
}

/// `latexmlpost --destination={output} --format=html {input}` — LaTeXML XML
/// to HTML (plus css/js byproducts, removed later by cleanup).
pub struct LatexmlPostConverter;

impl Converter for LatexmlPostConverter {
    fn name(&self) -> &str {
        "latexmlpost"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), RecordError> {
        let mut destination = OsString::from("--destination=");
        destination.push(output);
        run_tool(
            "latexmlpost",
            &[
                destination,
                OsString::from("--format=html"),
                input.as_os_str().to_owned(),
            ],
        )
    }
}

/// `pandoc -s {input} -o {output}` — JATS manuscript XML to standalone HTML.
pub struct PandocConverter;

impl Converter for PandocConverter {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), RecordError> {
        run_tool(
            "pandoc",
            &[
                OsString::from("-s"),
                input.as_os_str().to_owned(),
                OsString::from("-o"),
                output.as_os_str().to_owned(),
            ],
        )
    }
}

/// Spawn `program args…`, wait for it, and map the exit status to a result.
fn run_tool(program: &str, args: &[OsString]) -> Result<(), RecordError> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        let detail = if e.kind() == std::io::ErrorKind::NotFound {
            format!("{program} is not installed or not on PATH")
        } else {
            format!("failed to spawn {program}: {e}")
        };
        RecordError::ConverterFailed {
            tool: program.to_string(),
            detail,
        }
    })?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        Err(RecordError::ConverterFailed {
            tool: program.to_string(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_is_success() {
        run_tool("true", &[]).unwrap();
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let err = run_tool(
            "sh",
            &[
                OsString::from("-c"),
                OsString::from("echo boom >&2; exit 3"),
            ],
        )
        .unwrap_err();
        match err {
            RecordError::ConverterFailed { tool, detail } => {
                assert_eq!(tool, "sh");
                assert_eq!(detail, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn silent_failure_reports_exit_status() {
        let err = run_tool("false", &[]).unwrap_err();
        match err {
            RecordError::ConverterFailed { detail, .. } => {
                assert!(detail.contains("exit"), "got: {detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_binary_is_reported_as_not_installed() {
        let err = run_tool("paper2html-no-such-tool", &[]).unwrap_err();
        match err {
            RecordError::ConverterFailed { detail, .. } => {
                assert!(detail.contains("not installed"), "got: {detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
