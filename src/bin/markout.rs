//! CLI binary for markout.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and reports results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use markout::{
    convert, ConversionConfig, ConversionProgressCallback, LinkPreset, ProgressCallback,
    StyleLink, Theme,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

/// `n` or `?` while a scan is still running.
fn of_total(total: Option<usize>) -> String {
    total.map_or_else(|| "?".to_string(), |n| n.to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the run plus a log line per
/// written document.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the document currently being converted.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: Option<usize>) {
        match total_documents {
            Some(n) => self.bar.set_length(n as u64),
            None => self.bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {pos} files  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            ),
        }
    }

    fn on_document_start(&self, _index: usize, _total: Option<usize>, identifier: &str) {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        self.bar.set_message(identifier.to_string());
    }

    fn on_document_complete(
        &self,
        index: usize,
        total: Option<usize>,
        output: Option<&Path>,
        bytes: usize,
    ) {
        let secs = self.elapsed_secs();
        let target = output
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            index,
            of_total(total),
            bold(&target),
            dim(&format!("{bytes:>7} bytes")),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: Option<usize>, error: &str) {
        let _ = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            red("✗"),
            index,
            of_total(total),
            red(error.lines().next().unwrap_or(error)),
        ));
        self.bar.abandon();
    }

    fn on_run_complete(&self, converted: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} file(s) converted",
            green("✔"),
            bold(&converted.to_string()),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every *.md / *.markdown file in the current directory
  markout

  # Include subdirectories, replacing earlier output
  markout -r -w

  # Specific files into a custom directory
  markout README.md docs/guide.md -d site

  # Pipe through (fragment only, no <html> envelope)
  cat notes.md | markout -i -o

  # Full page on stdout with the retro theme
  markout -i -o -f -t retro < notes.md > notes.html

  # Framework stylesheet from a CDN plus local overrides
  markout -l pico -s overrides.css README.md

  # Also print a PDF next to each HTML file
  markout --pdf README.md

THEMES (-t):
  pandoc   readable serif layout (default when nothing else styles the page)
  retro    monospace, dark background
  blank    no built-in stylesheet
  none     default theme only if no --style / --link is given

LINKS (-l):
  bulma, bootstrap, tachyons, milligram, pure, wing, pico
  or any URL, inserted into <link rel="stylesheet" href="..."> as-is

ENVIRONMENT VARIABLES:
  MARKOUT_BROWSER   Browser executable used by --pdf
  RUST_LOG          Override log filter (e.g. markout=debug)
"#;

/// Convert Markdown files to HTML.
#[derive(Parser, Debug)]
#[command(
    name = "markout",
    version,
    about = "Convert Markdown files to HTML",
    long_about = "Convert Markdown files to HTML pages. Inputs come from explicit paths, a scan of \
the current directory for *.md and *.markdown files, or standard input. Output is written to an \
output directory or printed to standard output, optionally styled with a built-in theme, a custom \
stylesheet, or a CDN-hosted CSS framework, and optionally printed to PDF.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown files to convert. Without files, the current directory is scanned.
    files: Vec<PathBuf>,

    /// Output directory [default: ./markoutput]
    #[arg(short = 'd', long = "outdir")]
    outdir: Option<PathBuf>,

    /// Output file extension.
    #[arg(short, long, env = "MARKOUT_EXTENSION", default_value = ".html")]
    extension: String,

    /// Overwrite existing output files.
    #[arg(short = 'w', long)]
    overwrite: bool,

    /// Read input from stdin.
    #[arg(short = 'i', long)]
    stdin: bool,

    /// Print output to stdout.
    #[arg(short = 'o', long)]
    stdout: bool,

    /// Run recursively on subdirectory contents.
    #[arg(short = 'r', long = "recurse")]
    recurse: bool,

    /// Write complete HTML pages (default unless --stdout).
    #[arg(short = 'f', long, conflicts_with = "fragment")]
    full: bool,

    /// Write only the converted fragment (default with --stdout).
    #[arg(long)]
    fragment: bool,

    /// Built-in stylesheet to embed: none, pandoc, retro, blank.
    #[arg(short = 't', long, env = "MARKOUT_THEME")]
    theme: Option<String>,

    /// Path to a css file. Contents are injected into a <style> block.
    #[arg(short = 's', long = "style", env = "MARKOUT_STYLE", default_value = "none")]
    style: String,

    /// CSS framework keyword or URL for <link rel="stylesheet" />.
    #[arg(short = 'l', long, env = "MARKOUT_LINK", default_value = "none")]
    link: String,

    /// Also print each document to PDF via a headless browser.
    #[arg(long)]
    pdf: bool,

    /// Browser executable used for --pdf.
    #[arg(long, env = "MARKOUT_BROWSER")]
    browser: Option<PathBuf>,

    /// Seconds to wait for the browser per document.
    #[arg(long, env = "MARKOUT_PDF_TIMEOUT", default_value_t = 60)]
    pdf_timeout: u64,

    /// Sanitize the rendered HTML before assembly.
    #[arg(long)]
    sanitize: bool,

    /// Print a JSON run report on stdout.
    #[arg(long, conflicts_with = "stdout")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MARKOUT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MARKOUT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the progress bar active, per-file lines come from the callback;
    // library logs are cut to warnings so style problems still show.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress || cli.stdout {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert(&config).await.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !config.is_stdout() && !show_progress {
        for path in report.written_paths() {
            eprintln!("{} {}", green("✔"), path.display());
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let theme = cli.theme.as_deref().map(Theme::parse).unwrap_or_default();
    let link = StyleLink::parse(&cli.link);
    if let StyleLink::Url(ref url) = link {
        if !url.contains('/') && !url.contains('.') {
            tracing::warn!(
                "link '{}' is not a known preset ({}); using it as a URL",
                url,
                LinkPreset::ALL.map(LinkPreset::keyword).join(", ")
            );
        }
    }

    let mut builder = ConversionConfig::builder()
        .files(cli.files.iter().cloned())
        .stdin(cli.stdin)
        .recursive(cli.recurse)
        .stdout(cli.stdout)
        .extension(cli.extension.as_str())
        .overwrite(cli.overwrite)
        .theme(theme)
        .custom_css(&cli.style)
        .link(link)
        .pdf(cli.pdf)
        .pdf_timeout_secs(cli.pdf_timeout)
        .sanitize(cli.sanitize);

    if let Some(ref dir) = cli.outdir {
        builder = builder.output_dir(dir);
    }
    if cli.full {
        builder = builder.full_page(true);
    } else if cli.fragment {
        builder = builder.full_page(false);
    }
    if let Some(ref browser) = cli.browser {
        builder = builder.browser(browser);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use markout::{Destination, InputSelection};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("markout").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_scan_into_markoutput() {
        let config = build_config(&parse(&[]), None).unwrap();
        assert_eq!(config.input, InputSelection::Scan { recursive: false });
        assert_eq!(config.destination, Destination::Directory(PathBuf::from("./markoutput")));
        assert!(config.full_page);
    }

    #[test]
    fn stdin_and_file_conflict() {
        assert!(build_config(&parse(&["-i", "a.md"]), None).is_err());
    }

    #[test]
    fn stdout_and_outdir_conflict() {
        assert!(build_config(&parse(&["-o", "-d", "out"]), None).is_err());
    }

    #[test]
    fn stdin_and_recurse_conflict() {
        assert!(build_config(&parse(&["-i", "-r"]), None).is_err());
    }

    #[test]
    fn full_and_fragment_conflict() {
        assert!(Cli::try_parse_from(["markout", "--full", "--fragment"]).is_err());
    }

    #[test]
    fn stdout_full_page_override() {
        let config = build_config(&parse(&["-i", "-o", "-f"]), None).unwrap();
        assert!(config.full_page);
        let config = build_config(&parse(&["-i", "-o"]), None).unwrap();
        assert!(!config.full_page);
    }

    #[test]
    fn progress_callback_survives_poisoned_lock() {
        let cb = CliProgressCallback::new();
        let holder = Arc::clone(&cb);
        let _ = std::thread::spawn(move || {
            let _guard = holder.started.lock().unwrap();
            panic!("panic while holding the timer lock");
        })
        .join();
        assert!(cb.started.is_poisoned());

        cb.on_run_start(None);
        cb.on_document_start(1, None, "a");
        cb.on_document_complete(1, None, None, 3);
        cb.on_run_complete(1);
    }

    #[test]
    fn unknown_total_is_shown_as_question_mark() {
        assert_eq!(of_total(Some(4)), "4");
        assert_eq!(of_total(None), "?");
    }

    #[test]
    fn style_flags_map_to_selection() {
        let config =
            build_config(&parse(&["-t", "Retro", "-s", "x.css", "-l", "bulma"]), None).unwrap();
        assert_eq!(config.style.theme, Theme::Retro);
        assert_eq!(config.style.custom_css, Some(PathBuf::from("x.css")));
        assert_eq!(config.style.link, StyleLink::Preset(LinkPreset::Bulma));
    }
}
