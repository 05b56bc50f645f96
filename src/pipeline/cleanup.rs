//! Best-effort removal of staging directories and conversion byproducts.
//!
//! Cleanup runs unconditionally after all records are processed, regardless
//! of per-record failures. A deletion that fails is logged and ignored —
//! leftover staging files are an annoyance, not a correctness problem.

use std::path::Path;
use tracing::{debug, warn};

/// Remove entire staging directories (`extracted/`, `source/`, `xml/`).
pub fn remove_staging_dirs(dirs: &[&Path]) {
    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        match std::fs::remove_dir_all(dir) {
            Ok(()) => debug!("removed staging directory {}", dir.display()),
            Err(e) => warn!("could not remove {}: {e}", dir.display()),
        }
    }
}

/// Remove everything in the HTML output directory that is not an `.html`
/// file: latexmlpost drops css/js assets and sub-directories next to its
/// destination.
pub fn scrub_html_dir(html_dir: &Path) {
    let entries = match std::fs::read_dir(html_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("could not scan {}: {e}", html_dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let result = if path.is_dir() {
            std::fs::remove_dir_all(&path)
        } else if path.extension().is_some_and(|ext| ext == "html") {
            continue;
        } else {
            std::fs::remove_file(&path)
        };
        if let Err(e) = result {
            warn!("could not remove byproduct {}: {e}", path.display());
        }
    }
}

/// Remove stray `.log` and `.xml` files directly under `dir` — the LaTeXML
/// tools write both next to their destination paths.
pub fn remove_stray_tool_files(dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("could not scan {}: {e}", dir.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let stray = path
            .extension()
            .is_some_and(|ext| ext == "log" || ext == "xml");
        if stray {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("could not remove stray file {}: {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn staging_dirs_are_removed_and_missing_ones_ignored() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        let extracted = tmp.path().join("extracted");
        std::fs::create_dir_all(source.join("nested")).unwrap();
        touch(&source.join("nested/a.tar.gz"));

        remove_staging_dirs(&[&source, &extracted]);
        assert!(!source.exists());
        assert!(!extracted.exists());
    }

    #[test]
    fn scrub_leaves_only_html() {
        let tmp = TempDir::new().unwrap();
        let html = tmp.path().join("html");
        std::fs::create_dir_all(html.join("paper1_assets")).unwrap();
        touch(&html.join("paper1.html"));
        touch(&html.join("paper1.css"));
        touch(&html.join("LaTeXML.cache"));
        touch(&html.join("paper1_assets/logo.png"));

        scrub_html_dir(&html);

        let mut remaining: Vec<String> = std::fs::read_dir(&html)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["paper1.html"]);
    }

    #[test]
    fn stray_logs_and_xml_go_but_other_files_stay() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("2301.07041v1.xml"));
        touch(&tmp.path().join("2301.07041v1.log"));
        touch(&tmp.path().join("keep.txt"));
        std::fs::create_dir(tmp.path().join("pdf")).unwrap();

        remove_stray_tool_files(tmp.path());

        assert!(!tmp.path().join("2301.07041v1.xml").exists());
        assert!(!tmp.path().join("2301.07041v1.log").exists());
        assert!(tmp.path().join("keep.txt").exists());
        assert!(tmp.path().join("pdf").exists());
    }
}
