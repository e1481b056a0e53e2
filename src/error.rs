//! Error types for the markout library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MarkoutError`] — **Fatal**: the run cannot continue (conflicting
//!   flags, unreadable input, output collision, PDF export failure).
//!   Returned as `Err(MarkoutError)` from the top-level `convert*` functions.
//!   There is no partial-success accounting: the first error halts a batch.
//!
//! * [`StyleWarning`] — **Non-fatal**: a styling option could not be honoured
//!   (unknown theme name, unreadable custom stylesheet). The contribution is
//!   dropped, a warning is logged, and conversion continues. Warnings are
//!   collected in [`crate::output::DocumentResult`] so callers can report them.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All fatal errors returned by the markout library.
#[derive(Debug, Error)]
pub enum MarkoutError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed (conflicting flags). Raised before any I/O.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Error reading input file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Standard input could not be read to the end.
    #[error("Error reading from stdin: {0}")]
    StdinReadFailed(#[source] std::io::Error),

    /// The directory scan hit an unreadable entry.
    #[error("Error scanning '{root}' for Markdown files: {source}")]
    ScanFailed {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory scan found nothing to convert.
    #[error("No markdown files found in '{root}'\nPass files explicitly, or use -r/--recurse to search subdirectories.")]
    NoMarkdownFiles { root: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The computed output path is taken and overwriting is disabled.
    #[error("Output file {path:?} already exists, use -w or --overwrite to replace")]
    OutputExists { path: PathBuf },

    /// Could not create or write the output file.
    #[error("Error writing output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF export errors ─────────────────────────────────────────────────
    /// No Chromium-family browser could be located.
    #[error(
        "No headless browser found for PDF export.\n\
Install Chromium or Google Chrome, or point --browser / MARKOUT_BROWSER at the executable."
    )]
    BrowserNotFound,

    /// The browser ran but did not produce a PDF.
    #[error("PDF export failed for '{path}': {detail}")]
    PdfExportFailed { path: PathBuf, detail: String },

    /// The browser did not finish within the configured bound.
    #[error("PDF export timed out after {}s for '{path}'\nIncrease --pdf-timeout.", .timeout.as_secs())]
    PdfTimeout { path: PathBuf, timeout: Duration },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal styling problem.
///
/// The offending contribution is omitted from the CSS fragment; everything
/// else in the document is produced as normal.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum StyleWarning {
    /// The theme name matched none of the built-in stylesheets.
    #[error("invalid theme selection '{name}' - no theme data applied")]
    UnknownTheme { name: String },

    /// The custom stylesheet could not be read.
    #[error("error reading css file {path:?}: {detail}")]
    CustomCssUnreadable { path: PathBuf, detail: String },
}
