#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Conventional name of the script under audit, resolved against the
/// current directory when no path is given on the command line.
pub const DEFAULT_TARGET: &str = "main.py";

/// Directory marker files are written to, relative to the current directory.
pub const DEFAULT_MARKERS_DIR: &str = ".audit_markers";

/// Name (without extension) of the marker written when every required
/// milestone is complete.
pub const ALL_PASSED_MARKER: &str = "all_required_passed";

/// Extension used for marker files.
pub const MARKER_EXTENSION: &str = "txt";
