#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Audit run configuration.
//!
//! Everything the auditor needs is an explicit resolved path; there is no
//! ambient project-root discovery. Rule weights and wording are compiled
//! into the catalog and are not configurable here.

use std::path::{Path, PathBuf};

use bon::Builder;

use crate::constants::{DEFAULT_MARKERS_DIR, DEFAULT_TARGET};

/// Configuration for one audit run.
#[derive(Debug, Clone, Builder)]
pub struct AuditConfig {
    /// Path of the file under audit.
    #[builder(into, default = PathBuf::from(DEFAULT_TARGET))]
    target:        PathBuf,
    /// Directory marker files are written to.
    #[builder(into, default = PathBuf::from(DEFAULT_MARKERS_DIR))]
    markers_dir:   PathBuf,
    /// Whether to write marker files at all.
    #[builder(default = true)]
    write_markers: bool,
    /// Emit the AuditReport as JSON on stdout instead of the table.
    #[builder(default)]
    json:          bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AuditConfig {
    /// Path of the file under audit.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Directory marker files are written to.
    pub fn markers_dir(&self) -> &Path {
        &self.markers_dir
    }

    /// Whether to write marker files.
    pub fn write_markers(&self) -> bool {
        self.write_markers
    }

    /// Whether to emit JSON instead of the table.
    pub fn json(&self) -> bool {
        self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_main_py_and_marker_dir() {
        let config = AuditConfig::default();
        assert_eq!(config.target(), Path::new("main.py"));
        assert_eq!(config.markers_dir(), Path::new(".audit_markers"));
        assert!(config.write_markers());
        assert!(!config.json());
    }
}
