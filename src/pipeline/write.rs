//! Output writing: stdout printing or file persistence with an overwrite policy.
//!
//! File names are derived from the source identifier, never from the input
//! path, so `docs/guide.md` becomes `<outdir>/guide<extension>`.
//!
//! With overwrite disabled the file is opened with `create_new`, so an
//! existing output is rejected by the OS itself and its contents are never
//! touched, even if it appears between a check and the write.

use crate::error::MarkoutError;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// `<dir>/<identifier><extension>`.
pub fn output_path(dir: &Path, identifier: &str, extension: &str) -> PathBuf {
    dir.join(format!("{identifier}{extension}"))
}

/// `<dir>/<identifier>.pdf`, the sibling of the HTML output.
pub fn pdf_path(dir: &Path, identifier: &str) -> PathBuf {
    dir.join(format!("{identifier}.pdf"))
}

/// Print a document followed by a newline.
pub fn write_stdout<W: Write>(out: &mut W, html: &str) -> io::Result<()> {
    out.write_all(html.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Create the output directory if it is missing.
///
/// Failure is only logged: the following write reports the real error.
pub async fn ensure_output_dir(dir: &Path) {
    if tokio::fs::metadata(dir).await.is_ok() {
        return;
    }
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => debug!("Created output directory {}", dir.display()),
        Err(e) => warn!("error creating output directory {}: {}", dir.display(), e),
    }
}

/// Write `bytes` to `path`, honouring the overwrite policy.
///
/// * `overwrite = false` and `path` exists → [`MarkoutError::OutputExists`],
///   file unchanged.
/// * otherwise the file is created or truncated and replaced.
pub async fn write_file(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), MarkoutError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            MarkoutError::OutputExists {
                path: path.to_path_buf(),
            }
        } else {
            MarkoutError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let write_err = |source| MarkoutError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    file.write_all(bytes).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn output_path_uses_identifier_and_extension() {
        let p = output_path(Path::new("out"), "guide", ".html");
        assert_eq!(p, PathBuf::from("out/guide.html"));
        assert_eq!(pdf_path(Path::new("out"), "notes.v2"), PathBuf::from("out/notes.v2.pdf"));
    }

    #[test]
    fn stdout_appends_newline() {
        let mut buf = Vec::new();
        write_stdout(&mut buf, "<p>x</p>").unwrap();
        assert_eq!(buf, b"<p>x</p>\n");
    }

    #[tokio::test]
    async fn collision_without_overwrite_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.html");
        std::fs::write(&path, "original").unwrap();

        let err = write_file(&path, b"new", false).await.unwrap_err();
        assert!(matches!(err, MarkoutError::OutputExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[tokio::test]
    async fn overwrite_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.html");
        std::fs::write(&path, "a much longer original body").unwrap();

        write_file(&path, b"new", true).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[tokio::test]
    async fn ensure_output_dir_creates_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("x").join("y");
        ensure_output_dir(&nested).await;
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn uncreatable_dir_warns_then_write_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "a regular file").unwrap();
        let outdir = blocker.join("site");

        ensure_output_dir(&outdir).await;
        assert!(!outdir.exists());

        let err = write_file(&output_path(&outdir, "a", ".html"), b"x", false)
            .await
            .unwrap_err();
        match err {
            MarkoutError::OutputWriteFailed { path, .. } => assert_eq!(path, outdir.join("a.html")),
            other => panic!("expected OutputWriteFailed, got {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "a regular file");
    }

    #[tokio::test]
    async fn write_into_missing_dir_fails_with_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("a.html");
        let err = write_file(&path, b"x", false).await.unwrap_err();
        assert!(matches!(err, MarkoutError::OutputWriteFailed { .. }));
    }
}
