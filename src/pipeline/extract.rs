//! Tarball extraction and main `.tex` selection.
//!
//! arXiv e-prints are gzipped tarballs of the LaTeX project. Extraction is
//! synchronous (flate2 + tar read from a `File`); the orchestrator runs this
//! stage inside `spawn_blocking`.
//!
//! ## Main-file selection
//!
//! "First `.tex` by directory-listing order" is nondeterministic across
//! platforms, so selection is made deterministic: candidates are collected
//! from the whole extracted tree, sorted by path, and a file whose contents
//! mention `\documentclass` wins; ties fall to the lexicographically first
//! candidate. Multi-file projects with several `\documentclass` files can
//! still pick the wrong entry point, but the pick is at least stable.

use crate::error::RecordError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Unpack `tarball` into `dest_dir` (created if missing).
///
/// Malformed archives (HTML error pages, bare gzip, truncated data) fail the
/// record, not the run.
pub fn extract_tarball(tarball: &Path, dest_dir: &Path, id: &str) -> Result<(), RecordError> {
    std::fs::create_dir_all(dest_dir).map_err(|e| RecordError::Io {
        id: id.to_string(),
        detail: format!("creating {}: {e}", dest_dir.display()),
    })?;

    let file = File::open(tarball).map_err(|e| RecordError::Io {
        id: id.to_string(),
        detail: format!("opening {}: {e}", tarball.display()),
    })?;

    let gz = GzDecoder::new(file);
    let mut archive = Archive::new(gz);
    archive.unpack(dest_dir).map_err(|e| RecordError::BadArchive {
        id: id.to_string(),
        detail: e.to_string(),
    })?;

    debug!("extracted {} → {}", tarball.display(), dest_dir.display());
    Ok(())
}

/// Locate the main `.tex` file under `dir`.
pub fn find_main_tex(dir: &Path, id: &str) -> Result<PathBuf, RecordError> {
    let mut candidates = Vec::new();
    collect_tex_files(dir, &mut candidates).map_err(|e| RecordError::Io {
        id: id.to_string(),
        detail: format!("scanning {}: {e}", dir.display()),
    })?;
    candidates.sort();

    if candidates.is_empty() {
        return Err(RecordError::NoTexSource { id: id.to_string() });
    }

    for candidate in &candidates {
        if let Ok(contents) = std::fs::read_to_string(candidate) {
            if contents.contains("\\documentclass") {
                return Ok(candidate.clone());
            }
        }
    }

    // No \documentclass anywhere (or unreadable as UTF-8); fall back to the
    // first sorted candidate.
    Ok(candidates.remove(0))
}

fn collect_tex_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_tex_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "tex") {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    /// Build a gzipped tarball containing the given (path, contents) files.
    fn make_tarball(dest: &Path, files: &[(&str, &str)]) {
        let file = File::create(dest).unwrap();
        let gz = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(gz);
        for (path, contents) in files {
            let bytes = contents.as_bytes();
            let mut header = tar::Header::new_gnu();
            header.set_size(bytes.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, bytes).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn extracts_and_finds_documentclass_file() {
        let tmp = TempDir::new().unwrap();
        let tarball = tmp.path().join("paper.tar.gz");
        make_tarball(
            &tarball,
            &[
                ("aaa-appendix.tex", "\\section{Appendix}"),
                ("main.tex", "\\documentclass{article}\\begin{document}hi\\end{document}"),
                ("figures/plot.pdf", "%PDF-1.4"),
            ],
        );

        let dest = tmp.path().join("extracted");
        extract_tarball(&tarball, &dest, "2301.07041v1").unwrap();
        let tex = find_main_tex(&dest, "2301.07041v1").unwrap();
        // aaa-appendix.tex sorts first but lacks \documentclass.
        assert!(tex.ends_with("main.tex"), "got: {}", tex.display());
    }

    #[test]
    fn selection_is_deterministic_without_documentclass() {
        let tmp = TempDir::new().unwrap();
        let tarball = tmp.path().join("paper.tar.gz");
        make_tarball(
            &tarball,
            &[("zebra.tex", "z"), ("alpha.tex", "a"), ("mid.tex", "m")],
        );

        let dest = tmp.path().join("extracted");
        extract_tarball(&tarball, &dest, "id").unwrap();
        let tex = find_main_tex(&dest, "id").unwrap();
        assert!(tex.ends_with("alpha.tex"));
    }

    #[test]
    fn non_tarball_is_a_bad_archive() {
        let tmp = TempDir::new().unwrap();
        let fake = tmp.path().join("not-a-tarball.tar.gz");
        std::fs::write(&fake, "<html>404 not found</html>").unwrap();

        let dest = tmp.path().join("extracted");
        let err = extract_tarball(&fake, &dest, "bad-id").unwrap_err();
        assert!(matches!(err, RecordError::BadArchive { .. }), "got: {err}");
    }

    #[test]
    fn missing_tex_is_reported() {
        let tmp = TempDir::new().unwrap();
        let tarball = tmp.path().join("paper.tar.gz");
        make_tarball(&tarball, &[("README.md", "no tex here")]);

        let dest = tmp.path().join("extracted");
        extract_tarball(&tarball, &dest, "no-tex").unwrap();
        let err = find_main_tex(&dest, "no-tex").unwrap_err();
        assert!(matches!(err, RecordError::NoTexSource { .. }));
    }

    #[test]
    fn tex_files_in_subdirectories_are_found() {
        let tmp = TempDir::new().unwrap();
        let tarball = tmp.path().join("paper.tar.gz");
        make_tarball(
            &tarball,
            &[("src/paper.tex", "\\documentclass{article}")],
        );

        let dest = tmp.path().join("extracted");
        extract_tarball(&tarball, &dest, "nested").unwrap();
        let tex = find_main_tex(&dest, "nested").unwrap();
        assert!(tex.ends_with("src/paper.tex"));
    }
}
