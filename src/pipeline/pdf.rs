//! PDF export: print an assembled HTML document through a headless browser.
//!
//! ## How it works
//!
//! The browser can only print what it can load, so the HTML is written to a
//! temporary `.html` file next to the source document (relative image and
//! stylesheet links then resolve as they would in the source tree). The
//! browser is run headless with `--print-to-pdf` into a scratch directory,
//! and the resulting bytes are returned to the caller. Both temporaries are
//! removed when they go out of scope, including on error.
//!
//! The child process gets a bounded wait. When the bound expires the wait
//! future is dropped, and `kill_on_drop` terminates the browser.

use crate::error::MarkoutError;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Environment variable naming the browser executable.
pub const BROWSER_ENV: &str = "MARKOUT_BROWSER";

/// Executables probed on `PATH`, in order.
pub const BROWSER_CANDIDATES: [&str; 6] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
    "microsoft-edge",
];

/// One document to print.
#[derive(Debug, Clone, Copy)]
pub struct PrintRequest<'a> {
    /// Fully assembled HTML.
    pub html: &'a str,
    /// Directory relative URLs in the HTML resolve against.
    pub base_dir: &'a Path,
    /// Final PDF path; used in error messages only.
    pub target: &'a Path,
}

/// HTML → PDF bytes capability.
pub trait PdfPrinter: Send + Sync {
    fn print_to_pdf(
        &self,
        request: PrintRequest<'_>,
    ) -> impl Future<Output = Result<Vec<u8>, MarkoutError>> + Send;
}

/// Headless Chromium/Chrome/Edge driven as a child process.
#[derive(Debug, Clone)]
pub struct ChromePrinter {
    browser: PathBuf,
    timeout: Duration,
}

impl ChromePrinter {
    pub fn new(browser: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            browser: browser.into(),
            timeout,
        }
    }

    /// Find a browser: explicit path, then [`BROWSER_ENV`], then `PATH`.
    pub fn locate(explicit: Option<&Path>, timeout: Duration) -> Result<Self, MarkoutError> {
        if let Some(path) = explicit {
            return Ok(Self::new(path, timeout));
        }
        if let Some(path) = std::env::var_os(BROWSER_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(path, timeout));
        }
        BROWSER_CANDIDATES
            .iter()
            .find_map(|name| find_on_path(name))
            .map(|path| {
                debug!("Using browser {}", path.display());
                Self::new(path, timeout)
            })
            .ok_or(MarkoutError::BrowserNotFound)
    }

    pub fn browser(&self) -> &Path {
        &self.browser
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl PdfPrinter for ChromePrinter {
    async fn print_to_pdf(&self, request: PrintRequest<'_>) -> Result<Vec<u8>, MarkoutError> {
        let failed = |detail: String| MarkoutError::PdfExportFailed {
            path: request.target.to_path_buf(),
            detail,
        };

        let mut page = tempfile::Builder::new()
            .prefix(".markout-")
            .suffix(".html")
            .tempfile_in(request.base_dir)
            .or_else(|_| tempfile::Builder::new().prefix("markout-").suffix(".html").tempfile())
            .map_err(|e| failed(format!("cannot create temporary HTML file: {e}")))?;
        page.write_all(request.html.as_bytes())
            .and_then(|()| page.flush())
            .map_err(|e| failed(format!("cannot write temporary HTML file: {e}")))?;

        let scratch = tempfile::tempdir()
            .map_err(|e| failed(format!("cannot create scratch directory: {e}")))?;
        let pdf_out = scratch.path().join("print.pdf");
        let page_path = std::path::absolute(page.path())
            .map_err(|e| failed(format!("cannot resolve temporary HTML path: {e}")))?;

        let mut cmd = Command::new(&self.browser);
        cmd.args(browser_args(&pdf_out, &page_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Printing {} with {}", page_path.display(), self.browser.display());
        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MarkoutError::BrowserNotFound
            } else {
                failed(format!("cannot start {}: {e}", self.browser.display()))
            }
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(failed(format!("browser did not complete: {e}"))),
            Err(_) => {
                return Err(MarkoutError::PdfTimeout {
                    path: request.target.to_path_buf(),
                    timeout: self.timeout,
                })
            }
        };

        if !output.status.success() {
            return Err(failed(format!(
                "browser exited with {}: {}",
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        let bytes = tokio::fs::read(&pdf_out)
            .await
            .map_err(|e| failed(format!("browser produced no PDF ({e})")))?;
        if bytes.is_empty() {
            return Err(failed("browser produced an empty PDF".into()));
        }

        info!("Printed {} bytes of PDF", bytes.len());
        Ok(bytes)
    }
}

/// Command-line for a headless print of `page` into `pdf_out`.
fn browser_args(pdf_out: &Path, page: &Path) -> Vec<String> {
    vec![
        "--headless".into(),
        "--disable-gpu".into(),
        "--no-first-run".into(),
        "--no-pdf-header-footer".into(),
        format!("--print-to-pdf={}", pdf_out.display()),
        file_url(page),
    ]
}

/// `file://` URL for an absolute path.
fn file_url(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(3);
    let tail = lines[start..].join(" | ");
    if tail.is_empty() {
        "(no output)".into()
    } else {
        tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_url_unix_and_windows() {
        assert_eq!(file_url(Path::new("/tmp/a b.html")), "file:///tmp/a b.html");
        assert_eq!(file_url(Path::new("C:\\docs\\a.html")), "file:///C:/docs/a.html");
    }

    #[test]
    fn args_request_headless_print() {
        let args = browser_args(Path::new("/s/print.pdf"), Path::new("/d/page.html"));
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--print-to-pdf=/s/print.pdf".to_string()));
        assert_eq!(args.last().unwrap(), "file:///d/page.html");
    }

    #[test]
    fn explicit_browser_wins() {
        let p = ChromePrinter::locate(Some(Path::new("/opt/chrome")), Duration::from_secs(5)).unwrap();
        assert_eq!(p.browser(), Path::new("/opt/chrome"));
        assert_eq!(p.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        assert_eq!(stderr_tail(b""), "(no output)");
        assert_eq!(stderr_tail(b"a\n\nb\nc\nd\n"), "b | c | d");
    }

    #[tokio::test]
    async fn missing_browser_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let printer = ChromePrinter::new(dir.path().join("no-such-browser"), Duration::from_secs(5));
        let target = dir.path().join("a.pdf");
        let err = printer
            .print_to_pdf(PrintRequest {
                html: "<p>x</p>",
                base_dir: dir.path(),
                target: &target,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MarkoutError::BrowserNotFound));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hung_browser_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("slow-browser");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let printer = ChromePrinter::new(&script, Duration::from_millis(200));
        let target = dir.path().join("a.pdf");
        let err = printer
            .print_to_pdf(PrintRequest {
                html: "<p>x</p>",
                base_dir: dir.path(),
                target: &target,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MarkoutError::PdfTimeout { .. }), "got: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fake_browser_output_is_returned() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-browser");
        // Writes a stub PDF to the --print-to-pdf target.
        std::fs::write(
            &script,
            "#!/bin/sh\nfor a in \"$@\"; do case \"$a\" in --print-to-pdf=*) printf '%%PDF-1.4 stub' > \"${a#--print-to-pdf=}\";; esac; done\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let printer = ChromePrinter::new(&script, Duration::from_secs(10));
        let target = dir.path().join("a.pdf");
        let bytes = printer
            .print_to_pdf(PrintRequest {
                html: "<p>x</p>",
                base_dir: dir.path(),
                target: &target,
            })
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
