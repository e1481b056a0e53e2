//! Result types returned by the conversion entry points.
//!
//! Everything here is `Serialize` so the CLI can print a run as JSON
//! (`--json`) and library callers can log or persist it.

use crate::error::StyleWarning;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of one conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionReport {
    /// One entry per converted document, in processing order.
    pub documents: Vec<DocumentResult>,
    /// Styling problems that were degraded to "no contribution".
    pub style_warnings: Vec<StyleWarning>,
    /// Wall-clock time for the whole run.
    pub total_duration_ms: u64,
}

impl ConversionReport {
    /// Paths of every file written (HTML and PDF).
    pub fn written_paths(&self) -> Vec<&PathBuf> {
        self.documents
            .iter()
            .flat_map(|d| d.output_path.iter().chain(d.pdf_path.iter()))
            .collect()
    }
}

/// Outcome for a single source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Source identifier: file stem, or `MarkOut` for stdin.
    pub identifier: String,
    /// Input path; `None` for stdin.
    pub source: Option<PathBuf>,
    /// Written HTML path; `None` for stdout output.
    pub output_path: Option<PathBuf>,
    /// Written PDF path, when PDF export is enabled.
    pub pdf_path: Option<PathBuf>,
    /// Byte length of the assembled HTML.
    pub html_bytes: usize,
    pub duration_ms: u64,
}
