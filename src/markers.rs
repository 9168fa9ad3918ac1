#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Marker files for the downstream grading pipeline.
//!
//! One flat file per verified capability, named after the capability: the
//! first line is `Verified: <ISO-8601 timestamp>`, the second a free-text
//! description. Markers are a one-way signal; the auditor writes them and
//! never reads them back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::{
    constants::{ALL_PASSED_MARKER, MARKER_EXTENSION},
    report::AuditReport,
};

/// Writes one marker file under `dir`.
fn write_marker(dir: &Path, name: &str, description: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.{MARKER_EXTENSION}"));
    let timestamp = Utc::now().to_rfc3339();
    std::fs::write(&path, format!("Verified: {timestamp}\n{description}\n"))
        .with_context(|| format!("Could not write marker {}", path.display()))?;
    tracing::info!(marker = %path.display(), "marker created");
    Ok(path)
}

/// Writes a marker for every complete required milestone, plus the
/// all-passed marker when the whole audit passed. Returns the paths written.
pub fn write_markers(report: &AuditReport, dir: &Path) -> Result<Vec<PathBuf>> {
    let complete: Vec<_> = report
        .milestones
        .iter()
        .filter(|m| m.required && m.complete)
        .collect();

    if complete.is_empty() && !report.required_complete() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create marker directory {}", dir.display()))?;

    let mut written = Vec::new();
    for milestone in complete {
        written.push(write_marker(dir, &milestone.slug, &milestone.description)?);
    }

    if report.required_complete() {
        written.push(write_marker(
            dir,
            ALL_PASSED_MARKER,
            "All required milestones complete",
        )?);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::default_catalog,
        evaluate::audit,
        source::SourceDocument,
    };

    #[test]
    fn no_markers_written_when_nothing_passes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = SourceDocument::missing("main.py");
        let catalog = default_catalog().expect("catalog");
        let report = audit(&catalog, &doc).expect("audit");

        let written = write_markers(&report, dir.path()).expect("write markers");
        assert!(written.is_empty());
        assert!(!dir.path().join("code_structure.txt").exists());
    }

    #[test]
    fn marker_content_has_timestamp_line_then_description() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_marker(dir.path(), "code_structure", "structure verified")
            .expect("write marker");

        let content = std::fs::read_to_string(path).expect("read marker");
        let mut lines = content.lines();
        let first = lines.next().expect("timestamp line");
        assert!(first.starts_with("Verified: "));
        assert_eq!(lines.next(), Some("structure verified"));
    }
}
