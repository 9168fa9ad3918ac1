#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Loading the single file under audit.
//!
//! A missing file is a recognized state, not an error: every downstream rule
//! must be able to handle it (by skipping), so the loader only fails on
//! genuine I/O problems such as permission errors.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;

/// Whether the target file exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// The file exists and its text was loaded.
    Present,
    /// The file does not exist.
    Missing,
}

/// The raw text of the file under audit, loaded once and immutable for the
/// remainder of the run.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Path the document was loaded from (or would have been).
    path:     PathBuf,
    /// Full file content; `None` when the file is missing.
    text:     Option<String>,
    /// Whether the file exists.
    presence: Presence,
}

impl SourceDocument {
    /// Reads the file at `path`. A nonexistent file produces a `Missing`
    /// document rather than an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Self {
                path,
                text: Some(text),
                presence: Presence::Present,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "target file not found");
                Ok(Self {
                    path,
                    text: None,
                    presence: Presence::Missing,
                })
            }
            Err(e) => {
                Err(e).with_context(|| format!("Could not read {}", path.display()))
            }
        }
    }

    /// Builds a present document from in-memory text.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path:     path.into(),
            text:     Some(text.into()),
            presence: Presence::Present,
        }
    }

    /// Builds a missing document for the given path.
    pub fn missing(path: impl Into<PathBuf>) -> Self {
        Self {
            path:     path.into(),
            text:     None,
            presence: Presence::Missing,
        }
    }

    /// Path the document is associated with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full text of the document, or `None` when the file is missing.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the file exists.
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Convenience check for `Presence::Present`.
    pub fn is_present(&self) -> bool {
        self.presence == Presence::Present
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_of_nonexistent_path_is_missing_not_error() {
        let doc = SourceDocument::load("definitely/not/here/main.py").expect("load");
        assert_eq!(doc.presence(), Presence::Missing);
        assert!(doc.text().is_none());
    }

    #[test]
    fn load_reads_full_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.py");
        std::fs::write(&path, "import time\n").expect("write fixture");

        let doc = SourceDocument::load(&path).expect("load");
        assert!(doc.is_present());
        assert_eq!(doc.text(), Some("import time\n"));
    }
}
