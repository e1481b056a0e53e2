//! Configuration types for Markdown-to-HTML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! once via its [`ConversionConfigBuilder`] and passed by reference to every
//! pipeline stage. No stage reads process-wide state; two configs can be
//! diffed to explain why two runs produced different bytes.
//!
//! Flag conflicts (stdin + files, stdout + output directory, …) are rejected
//! by [`ConversionConfigBuilder::build`] before any I/O happens.

use crate::error::MarkoutError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "./markoutput";

/// Default output file extension (leading dot included).
pub const DEFAULT_EXTENSION: &str = ".html";

/// Identifier given to the document read from standard input.
pub const STDIN_IDENTIFIER: &str = "MarkOut";

/// Sentinel accepted by `--style` and `--link` meaning "no contribution".
pub const NONE_SENTINEL: &str = "none";

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use markout::{ConversionConfig, Theme};
///
/// let config = ConversionConfig::builder()
///     .files(["README.md"])
///     .output_dir("site")
///     .theme(Theme::Retro)
///     .overwrite(true)
///     .build()
///     .unwrap();
/// assert!(config.full_page);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Where inputs come from. Default: scan the working directory.
    pub input: InputSelection,

    /// Root of the directory scan when no files are given. Default: `.`
    pub scan_root: PathBuf,

    /// Where outputs go. Default: [`DEFAULT_OUTPUT_DIR`].
    pub destination: Destination,

    /// Output file extension, leading dot included. Default: `.html`.
    pub extension: String,

    /// Replace existing output files. Default: false.
    pub overwrite: bool,

    /// Wrap the fragment in a complete HTML document. Default: true.
    pub full_page: bool,

    /// Theme, custom stylesheet and external link choices.
    pub style: StyleSelection,

    /// Also print each document to `<identifier>.pdf`. Default: false.
    pub pdf: bool,

    /// Browser executable for PDF export. If None, auto-detected.
    pub browser: Option<PathBuf>,

    /// Bounded wait for a single PDF print. Default: 60 s.
    pub pdf_timeout: Duration,

    /// Run the rendered fragment through the HTML sanitizer. Default: false.
    pub sanitize: bool,

    /// Optional per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input: InputSelection::default(),
            scan_root: PathBuf::from("."),
            destination: Destination::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            overwrite: false,
            full_page: true,
            style: StyleSelection::default(),
            pdf: false,
            browser: None,
            pdf_timeout: Duration::from_secs(60),
            sanitize: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("input", &self.input)
            .field("scan_root", &self.scan_root)
            .field("destination", &self.destination)
            .field("extension", &self.extension)
            .field("overwrite", &self.overwrite)
            .field("full_page", &self.full_page)
            .field("style", &self.style)
            .field("pdf", &self.pdf)
            .field("browser", &self.browser)
            .field("pdf_timeout", &self.pdf_timeout)
            .field("sanitize", &self.sanitize)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
            output_dir_set: false,
            full_page_set: false,
        }
    }

    /// True when output goes to standard output instead of files.
    pub fn is_stdout(&self) -> bool {
        matches!(self.destination, Destination::Stdout)
    }
}

/// Builder for [`ConversionConfig`].
///
/// Tracks whether the output directory and full-page mode were set
/// explicitly, because both have stdout-dependent defaults.
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
    output_dir_set: bool,
    full_page_set: bool,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .field("output_dir_set", &self.output_dir_set)
            .field("full_page_set", &self.full_page_set)
            .finish()
    }
}

impl ConversionConfigBuilder {
    /// Convert these files, in order.
    ///
    /// An empty list leaves the selection unchanged, so the directory scan
    /// (or stdin) still applies.
    pub fn files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let files: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
        if files.is_empty() {
            return self;
        }
        self.config.input = match self.config.input {
            InputSelection::Stdin | InputSelection::StdinRecursive | InputSelection::Conflict(_) => {
                InputSelection::Conflict(files)
            }
            InputSelection::Files(_) | InputSelection::Scan { .. } => InputSelection::Files(files),
        };
        self
    }

    /// Read one document from standard input.
    pub fn stdin(mut self, v: bool) -> Self {
        if v {
            self.config.input = match self.config.input {
                InputSelection::Files(files) => InputSelection::Conflict(files),
                InputSelection::Scan { recursive: true } => InputSelection::StdinRecursive,
                other @ (InputSelection::Conflict(_) | InputSelection::StdinRecursive) => other,
                InputSelection::Scan { recursive: false } | InputSelection::Stdin => {
                    InputSelection::Stdin
                }
            };
        }
        self
    }

    /// Scan subdirectories too when no files are given.
    pub fn recursive(mut self, v: bool) -> Self {
        if v {
            self.config.input = match self.config.input {
                InputSelection::Scan { .. } => InputSelection::Scan { recursive: true },
                InputSelection::Stdin => InputSelection::StdinRecursive,
                other => other,
            };
        }
        self
    }

    pub fn scan_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.scan_root = root.into();
        self
    }

    /// Write files into `dir`.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir_set = true;
        if !self.config.is_stdout() {
            self.config.destination = Destination::Directory(dir.into());
        }
        self
    }

    /// Print to standard output instead of writing files.
    pub fn stdout(mut self, v: bool) -> Self {
        if v {
            self.config.destination = Destination::Stdout;
        }
        self
    }

    /// Output extension. A missing leading dot is added.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.config.extension = if ext.is_empty() || ext.starts_with('.') {
            ext
        } else {
            format!(".{ext}")
        };
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.config.overwrite = v;
        self
    }

    /// Force full-page (`true`) or fragment (`false`) output.
    ///
    /// When never called, full-page mode is on for file output and off for
    /// stdout output.
    pub fn full_page(mut self, v: bool) -> Self {
        self.full_page_set = true;
        self.config.full_page = v;
        self
    }

    pub fn style(mut self, style: StyleSelection) -> Self {
        self.config.style = style;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.config.style.theme = theme;
        self
    }

    /// Custom stylesheet path; the `none` sentinel clears it.
    pub fn custom_css(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.config.style.custom_css = if path.as_os_str().eq_ignore_ascii_case(NONE_SENTINEL)
            || path.as_os_str().is_empty()
        {
            None
        } else {
            Some(path)
        };
        self
    }

    pub fn link(mut self, link: StyleLink) -> Self {
        self.config.style.link = link;
        self
    }

    pub fn pdf(mut self, v: bool) -> Self {
        self.config.pdf = v;
        self
    }

    pub fn browser(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser = Some(path.into());
        self
    }

    pub fn pdf_timeout_secs(mut self, secs: u64) -> Self {
        self.config.pdf_timeout = Duration::from_secs(secs.max(1));
        self
    }

    pub fn sanitize(mut self, v: bool) -> Self {
        self.config.sanitize = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, rejecting conflicting flags.
    pub fn build(mut self) -> Result<ConversionConfig, MarkoutError> {
        let c = &self.config;
        if c.is_stdout() && self.output_dir_set {
            return Err(MarkoutError::InvalidConfig(
                "--stdout cannot be combined with --outdir".into(),
            ));
        }
        match &c.input {
            InputSelection::Conflict(files) => {
                return Err(MarkoutError::InvalidConfig(format!(
                    "--stdin cannot be combined with file arguments ({} given)",
                    files.len()
                )));
            }
            InputSelection::StdinRecursive => {
                return Err(MarkoutError::InvalidConfig(
                    "--stdin cannot be combined with --recurse".into(),
                ));
            }
            _ => {}
        }
        if c.is_stdout() && c.pdf {
            return Err(MarkoutError::InvalidConfig(
                "--pdf requires file output and cannot be combined with --stdout".into(),
            ));
        }
        if !self.full_page_set {
            self.config.full_page = !self.config.is_stdout();
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Where source documents come from.
///
/// `Conflict` and `StdinRecursive` only exist so the builder can record an
/// invalid combination and report it from `build()`; a built config never
/// holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSelection {
    /// Explicit paths, converted in the given order.
    Files(Vec<PathBuf>),
    /// Scan the scan root for `*.md` / `*.markdown`. (default)
    Scan { recursive: bool },
    /// One document read from standard input.
    Stdin,
    #[doc(hidden)]
    Conflict(Vec<PathBuf>),
    #[doc(hidden)]
    StdinRecursive,
}

impl Default for InputSelection {
    fn default() -> Self {
        InputSelection::Scan { recursive: false }
    }
}

/// Where assembled documents are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Print each document followed by a newline.
    Stdout,
    /// Write `<identifier><extension>` into this directory.
    Directory(PathBuf),
}

impl Default for Destination {
    fn default() -> Self {
        Destination::Directory(PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

/// Styling choices. The three parts are independent and additive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSelection {
    pub theme: Theme,
    pub custom_css: Option<PathBuf>,
    pub link: StyleLink,
}

/// Built-in stylesheet selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    /// No `--theme` given. (default)
    #[default]
    Unset,
    /// Explicit `none`: default theme only when nothing else styles the page.
    None,
    /// The pandoc-like reading stylesheet; also the default.
    Pandoc,
    /// A monospace, terminal-flavoured stylesheet.
    Retro,
    /// Suppress the built-in stylesheet entirely.
    Blank,
    /// Unrecognised name; contributes nothing and produces a warning.
    Invalid(String),
}

impl Theme {
    /// Parse a theme name, case-insensitively. Never fails: unknown names
    /// become [`Theme::Invalid`] so the warning can name them.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" => Theme::Unset,
            "none" => Theme::None,
            "pandoc" => Theme::Pandoc,
            "retro" => Theme::Retro,
            "blank" => Theme::Blank,
            _ => Theme::Invalid(name.to_string()),
        }
    }
}

/// External stylesheet choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleLink {
    /// No link tag. (default)
    #[default]
    None,
    /// A pinned CDN stylesheet for a popular CSS framework.
    Preset(LinkPreset),
    /// Any other value, inserted into `href` verbatim.
    Url(String),
}

impl StyleLink {
    /// Parse a `--link` value: `none`, a preset keyword (case-insensitive),
    /// or a literal URL.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NONE_SENTINEL) {
            return StyleLink::None;
        }
        match LinkPreset::from_keyword(trimmed) {
            Some(preset) => StyleLink::Preset(preset),
            None => StyleLink::Url(trimmed.to_string()),
        }
    }
}

/// CSS frameworks with a pinned CDN URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkPreset {
    Bulma,
    Bootstrap,
    Tachyons,
    Milligram,
    Pure,
    Wing,
    Pico,
}

impl LinkPreset {
    pub const ALL: [LinkPreset; 7] = [
        LinkPreset::Bulma,
        LinkPreset::Bootstrap,
        LinkPreset::Tachyons,
        LinkPreset::Milligram,
        LinkPreset::Pure,
        LinkPreset::Wing,
        LinkPreset::Pico,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            LinkPreset::Bulma => "bulma",
            LinkPreset::Bootstrap => "bootstrap",
            LinkPreset::Tachyons => "tachyons",
            LinkPreset::Milligram => "milligram",
            LinkPreset::Pure => "pure",
            LinkPreset::Wing => "wing",
            LinkPreset::Pico => "pico",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.keyword().eq_ignore_ascii_case(keyword))
    }
}
