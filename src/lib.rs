//! # markout
//!
//! Convert Markdown documents to HTML, optionally wrapped in a complete,
//! styled HTML page and optionally printed to PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Input     explicit files, a *.md / *.markdown scan, or stdin
//!  ├─ 2. Style     built-in theme + custom stylesheet + CDN link (additive)
//!  ├─ 3. Render    CommonMark → HTML fragment via pulldown-cmark
//!  ├─ 4. Assemble  fixed HTML5 envelope, or the bare fragment
//!  ├─ 5. Write     stdout, or <outdir>/<name>.html with an overwrite policy
//!  └─ 6. PDF       optional headless-browser print to <outdir>/<name>.pdf
//! ```
//!
//! Documents are processed one at a time and the first error stops the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use markout::{convert, ConversionConfig, StyleLink};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .files(["README.md", "CHANGELOG.md"])
//!         .output_dir("site")
//!         .link(StyleLink::parse("pico"))
//!         .overwrite(true)
//!         .build()?;
//!     let report = convert(&config).await?;
//!     for doc in &report.documents {
//!         eprintln!("{} -> {:?}", doc.identifier, doc.output_path);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For a single string, [`convert_str`] skips all I/O:
//!
//! ```rust
//! use markout::{convert_str, ConversionConfig};
//!
//! let config = ConversionConfig::builder().full_page(false).build().unwrap();
//! assert_eq!(convert_str("# Hi", "hi", &config), "<h1>Hi</h1>\n");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `markout` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionConfigBuilder, Destination, InputSelection, LinkPreset,
    StyleLink, StyleSelection, Theme,
};
pub use convert::{convert, convert_str, convert_sync, Converter};
pub use error::{MarkoutError, StyleWarning};
pub use output::{ConversionReport, DocumentResult};
pub use pipeline::input::{SourceDocument, SourceDocuments};
pub use pipeline::pdf::{ChromePrinter, PdfPrinter, PrintRequest};
pub use pipeline::render::{MarkdownRenderer, PulldownRenderer};
pub use pipeline::sanitize::{AmmoniaSanitizer, HtmlSanitizer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
