//! Conversion entry points and the per-document orchestration.
//!
//! [`Converter`] owns the resolved CSS fragment and the three external
//! capabilities (renderer, sanitizer, PDF printer) and walks a list of
//! [`SourceDocument`]s strictly one at a time:
//!
//! ```text
//! render ─▶ sanitize? ─▶ assemble ─▶ stdout | file ─▶ pdf?
//! ```
//!
//! Each source is read only when its turn comes, so the first error (a
//! missing input as much as an output collision) stops the run with the
//! earlier documents already written. [`convert`] is the one-call API that
//! also resolves inputs (including reading standard input) from the config.

use crate::config::{ConversionConfig, Destination};
use crate::error::MarkoutError;
use crate::output::{ConversionReport, DocumentResult};
use crate::pipeline::assemble::assemble_document;
use crate::pipeline::input::{self, SourceDocument};
use crate::pipeline::pdf::{ChromePrinter, PdfPrinter, PrintRequest};
use crate::pipeline::render::{MarkdownRenderer, PulldownRenderer};
use crate::pipeline::sanitize::{AmmoniaSanitizer, HtmlSanitizer};
use crate::pipeline::style::{resolve_style, StyleFragment};
use crate::pipeline::write;
use std::borrow::Borrow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Resolve inputs from `config`, convert them all, and write the outputs.
///
/// Sources are read one at a time, right before each is converted; standard
/// input is read when the config asks for it. Stdout output goes to the
/// process's standard output.
///
/// # Errors
/// Returns the first fatal error: unreadable input, empty scan, output
/// collision, write failure, or PDF export failure.
pub async fn convert(config: &ConversionConfig) -> Result<ConversionReport, MarkoutError> {
    let sources = input::resolve_inputs(config, io::stdin())?;
    let total = sources.expected_len();

    let converter = Converter::new(config.clone());
    converter.run_sources(sources, total, &mut io::stdout()).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionReport, MarkoutError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MarkoutError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(config))
}

/// Convert Markdown text in memory, without touching inputs or outputs.
///
/// Uses the config's style, sanitize and full-page settings; style
/// warnings are logged.
pub fn convert_str(markdown: &str, title: &str, config: &ConversionConfig) -> String {
    Converter::new(config.clone()).render_markdown(markdown, title)
}

/// Sequential document converter.
///
/// Generic over the renderer and PDF printer so either can be replaced
/// (tests use fakes for both).
pub struct Converter<R = PulldownRenderer, P = ChromePrinter> {
    config: ConversionConfig,
    style: StyleFragment,
    renderer: R,
    printer: Option<P>,
    sanitizer: Box<dyn HtmlSanitizer>,
}

impl Converter {
    /// Converter with the default engines.
    ///
    /// When PDF export is enabled but no browser can be found, HTML output
    /// still works and each PDF export fails with
    /// [`MarkoutError::BrowserNotFound`].
    pub fn new(config: ConversionConfig) -> Self {
        let printer = if config.pdf {
            match ChromePrinter::locate(config.browser.as_deref(), config.pdf_timeout) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        } else {
            None
        };
        Self {
            style: resolve_style(&config.style),
            config,
            renderer: PulldownRenderer,
            printer,
            sanitizer: Box::new(AmmoniaSanitizer),
        }
    }
}

impl<R: MarkdownRenderer, P: PdfPrinter> Converter<R, P> {
    /// Swap the Markdown engine.
    pub fn with_renderer<R2: MarkdownRenderer>(self, renderer: R2) -> Converter<R2, P> {
        Converter {
            config: self.config,
            style: self.style,
            renderer,
            printer: self.printer,
            sanitizer: self.sanitizer,
        }
    }

    /// Swap the PDF engine.
    pub fn with_printer<P2: PdfPrinter>(self, printer: P2) -> Converter<R, P2> {
        Converter {
            config: self.config,
            style: self.style,
            renderer: self.renderer,
            printer: Some(printer),
            sanitizer: self.sanitizer,
        }
    }

    /// Swap the sanitizer used when `config.sanitize` is on.
    pub fn with_sanitizer(mut self, sanitizer: impl HtmlSanitizer + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// The CSS fragment every full page of this run embeds.
    pub fn style(&self) -> &StyleFragment {
        &self.style
    }

    /// Render, optionally sanitize, and assemble one Markdown text.
    pub fn render_markdown(&self, markdown: &str, title: &str) -> String {
        let mut fragment = self.renderer.render(markdown);
        if self.config.sanitize {
            fragment = self.sanitizer.sanitize(&fragment);
        }
        assemble_document(&fragment, title, &self.style.css, self.config.full_page)
    }

    /// Final HTML for a source document.
    pub fn render_document(&self, doc: &SourceDocument) -> String {
        self.render_markdown(&doc.text(), &doc.identifier)
    }

    /// Convert every document in order, stopping at the first error.
    ///
    /// `stdout` receives the documents when the destination is stdout.
    pub async fn run<W: Write + Send>(
        &self,
        documents: &[SourceDocument],
        stdout: &mut W,
    ) -> Result<ConversionReport, MarkoutError> {
        self.run_sources(documents.iter().map(Ok), Some(documents.len()), stdout)
            .await
    }

    /// Pull documents from `sources` one at a time and convert each before
    /// reading the next.
    ///
    /// A source error stops the run like any conversion error; outputs of
    /// earlier documents stay written. `total` is only reported to the
    /// progress callback.
    pub async fn run_sources<I, D, W>(
        &self,
        sources: I,
        total: Option<usize>,
        stdout: &mut W,
    ) -> Result<ConversionReport, MarkoutError>
    where
        I: IntoIterator<Item = Result<D, MarkoutError>>,
        D: Borrow<SourceDocument>,
        W: Write + Send,
    {
        let run_start = Instant::now();
        match total {
            Some(n) => info!("Converting {} document(s)", n),
            None => info!("Converting documents as they are found"),
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_run_start(total);
        }

        let mut results = Vec::with_capacity(total.unwrap_or(0));
        for (i, source) in sources.into_iter().enumerate() {
            let index = i + 1;
            let outcome = match source {
                Ok(doc) => {
                    let doc: &SourceDocument = doc.borrow();
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_document_start(index, total, &doc.identifier);
                    }
                    self.convert_document(doc, stdout).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(result) => {
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_document_complete(
                            index,
                            total,
                            result.output_path.as_deref(),
                            result.html_bytes,
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_document_error(index, total, &e.to_string());
                    }
                    return Err(e);
                }
            }
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_run_complete(results.len());
        }

        Ok(ConversionReport {
            documents: results,
            style_warnings: self.style.warnings.clone(),
            total_duration_ms: run_start.elapsed().as_millis() as u64,
        })
    }

    /// Convert and persist a single document.
    pub async fn convert_document<W: Write + Send>(
        &self,
        doc: &SourceDocument,
        stdout: &mut W,
    ) -> Result<DocumentResult, MarkoutError> {
        let start = Instant::now();
        let html = self.render_document(doc);
        debug!("{}: assembled {} bytes", doc.identifier, html.len());

        let mut result = DocumentResult {
            identifier: doc.identifier.clone(),
            source: doc.path.clone(),
            output_path: None,
            pdf_path: None,
            html_bytes: html.len(),
            duration_ms: 0,
        };

        match &self.config.destination {
            Destination::Stdout => {
                write::write_stdout(stdout, &html)
                    .map_err(|e| MarkoutError::Internal(format!("Failed to write to stdout: {e}")))?;
            }
            Destination::Directory(dir) => {
                write::ensure_output_dir(dir).await;
                let path = write::output_path(dir, &doc.identifier, &self.config.extension);
                write::write_file(&path, html.as_bytes(), self.config.overwrite).await?;
                info!("Successfully converted {} to {}", doc.origin(), path.display());
                result.output_path = Some(path);

                if self.config.pdf {
                    let pdf = self.export_pdf(doc, dir, &html).await?;
                    result.pdf_path = Some(pdf);
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn export_pdf(
        &self,
        doc: &SourceDocument,
        dir: &Path,
        html: &str,
    ) -> Result<PathBuf, MarkoutError> {
        let printer = self.printer.as_ref().ok_or(MarkoutError::BrowserNotFound)?;
        let target = write::pdf_path(dir, &doc.identifier);
        let base_dir = doc
            .path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let bytes = printer
            .print_to_pdf(PrintRequest {
                html,
                base_dir,
                target: &target,
            })
            .await?;
        write::write_file(&target, &bytes, self.config.overwrite).await?;
        info!("Successfully printed {} to {}", doc.origin(), target.display());
        Ok(target)
    }
}
