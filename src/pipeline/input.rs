//! Input resolution: turn the configured input selection into source documents.
//!
//! Three sources exist: explicit paths, a directory scan, and standard input.
//! Explicit paths are read in argument order and any failure aborts the
//! whole run. The scan is a lazy iterator ([`MarkdownScan`]) over a caller
//! supplied root, so it can be tested against a temp directory without
//! touching the process working directory.

use crate::config::{ConversionConfig, InputSelection, STDIN_IDENTIFIER};
use crate::error::MarkoutError;
use std::collections::VecDeque;
use std::fs::{self, ReadDir};
use std::io::{self, Read};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Base-name suffixes accepted by the scan (`*.md`, `*.markdown`).
const MARKDOWN_SUFFIXES: [&str; 2] = [".md", ".markdown"];

/// One Markdown input, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File stem, or [`STDIN_IDENTIFIER`] for standard input.
    pub identifier: String,
    /// Where the bytes came from; `None` for standard input.
    pub path: Option<PathBuf>,
    pub raw: Vec<u8>,
}

impl SourceDocument {
    /// Build a document for a file, deriving the identifier from its name.
    pub fn from_file(path: impl Into<PathBuf>, raw: Vec<u8>) -> Self {
        let path = path.into();
        Self {
            identifier: identifier_for(&path),
            path: Some(path),
            raw,
        }
    }

    /// Build the standard-input document.
    pub fn from_stdin(raw: Vec<u8>) -> Self {
        Self {
            identifier: STDIN_IDENTIFIER.to_string(),
            path: None,
            raw,
        }
    }

    /// Markdown text; invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    /// Human-readable origin for log lines.
    pub fn origin(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => "stdin".to_string(),
        }
    }
}

/// File name without its final extension (`notes.v2.md` → `notes.v2`).
pub fn identifier_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// True when a base name matches `*.md` or `*.markdown` (case-sensitive).
pub fn is_markdown_name(name: &str) -> bool {
    MARKDOWN_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Resolve the configured inputs into a lazy sequence of documents.
///
/// Nothing is read here except the first scan entry, which decides the
/// `NoMarkdownFiles` case. Each document is read when the sequence is
/// advanced, so a run holds at most one source in memory and a read failure
/// surfaces only after the earlier documents have been written.
///
/// `stdin` is a parameter rather than `std::io::stdin()` so callers and
/// tests can supply any reader.
pub fn resolve_inputs<R: Read>(
    config: &ConversionConfig,
    stdin: R,
) -> Result<SourceDocuments<R>, MarkoutError> {
    let sources = match &config.input {
        InputSelection::Stdin => Sources::Stdin(Some(stdin)),
        InputSelection::Files(files) => Sources::Files(files.clone().into_iter()),
        InputSelection::Scan { recursive } => {
            let root = config.scan_root.clone();
            let mut scan = MarkdownScan::new(&root, *recursive).peekable();
            let first_failed = match scan.peek() {
                None => return Err(MarkoutError::NoMarkdownFiles { root }),
                Some(first) => first.is_err(),
            };
            if first_failed {
                if let Some(Err(source)) = scan.next() {
                    return Err(MarkoutError::ScanFailed { root, source });
                }
            }
            info!(
                "Scanning {} for markdown files{}",
                root.display(),
                if *recursive { " (recursive)" } else { "" }
            );
            Sources::Scan { root, scan }
        }
        InputSelection::Conflict(_) | InputSelection::StdinRecursive => {
            return Err(MarkoutError::InvalidConfig("conflicting input flags".into()))
        }
    };
    Ok(SourceDocuments {
        sources,
        failed: false,
    })
}

/// Documents produced by [`resolve_inputs`], read one per `next()`.
///
/// The sequence ends after the first error.
#[derive(Debug)]
pub struct SourceDocuments<R> {
    sources: Sources<R>,
    failed: bool,
}

#[derive(Debug)]
enum Sources<R> {
    Stdin(Option<R>),
    Files(std::vec::IntoIter<PathBuf>),
    Scan {
        root: PathBuf,
        scan: Peekable<MarkdownScan>,
    },
}

impl<R> SourceDocuments<R> {
    /// Number of documents, when known before the walk. `None` for scans.
    pub fn expected_len(&self) -> Option<usize> {
        match &self.sources {
            Sources::Stdin(reader) => Some(usize::from(reader.is_some())),
            Sources::Files(paths) => Some(paths.len()),
            Sources::Scan { .. } => None,
        }
    }
}

impl<R: Read> Iterator for SourceDocuments<R> {
    type Item = Result<SourceDocument, MarkoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match &mut self.sources {
            Sources::Stdin(reader) => reader.take().map(read_stdin),
            Sources::Files(paths) => paths.next().map(|p| read_source(&p)),
            Sources::Scan { root, scan } => scan.next().map(|entry| match entry {
                Ok(path) => read_source(&path),
                Err(source) => Err(MarkoutError::ScanFailed {
                    root: root.clone(),
                    source,
                }),
            }),
        };
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

/// Read the whole stream as the single `MarkOut` document.
///
/// An empty stream is valid and yields an empty document.
pub fn read_stdin<R: Read>(mut reader: R) -> Result<SourceDocument, MarkoutError> {
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(MarkoutError::StdinReadFailed)?;
    debug!("Read {} bytes from stdin", raw.len());
    Ok(SourceDocument::from_stdin(raw))
}

/// Read one Markdown file, classifying the failure.
pub fn read_source(path: &Path) -> Result<SourceDocument, MarkoutError> {
    match fs::read(path) {
        Ok(raw) => {
            debug!("Read {} bytes from {}", raw.len(), path.display());
            Ok(SourceDocument::from_file(path, raw))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MarkoutError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(MarkoutError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(MarkoutError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Collect the scan eagerly, failing on the first unreadable entry.
pub fn find_markdown_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, MarkoutError> {
    MarkdownScan::new(root, recursive)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| MarkoutError::ScanFailed {
            root: root.to_path_buf(),
            source,
        })
}

/// Lazy walk yielding Markdown files under a root.
///
/// Order is directory-read order and is not sorted. A non-recursive scan only
/// looks at the root's immediate children. Directories are never yielded.
/// Once an error has been yielded the scan ends.
#[derive(Debug)]
pub struct MarkdownScan {
    recursive: bool,
    pending: VecDeque<PathBuf>,
    current: Option<ReadDir>,
    failed: bool,
}

impl MarkdownScan {
    pub fn new(root: impl Into<PathBuf>, recursive: bool) -> Self {
        Self {
            recursive,
            pending: VecDeque::from([root.into()]),
            current: None,
            failed: false,
        }
    }

    fn fail(&mut self, e: io::Error) -> Option<io::Result<PathBuf>> {
        self.failed = true;
        Some(Err(e))
    }
}

impl Iterator for MarkdownScan {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let Some(dir) = self.current.as_mut() else {
                let next_dir = self.pending.pop_front()?;
                match fs::read_dir(&next_dir) {
                    Ok(rd) => self.current = Some(rd),
                    Err(e) => return self.fail(e),
                }
                continue;
            };

            let entry = match dir.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.current = None;
                    continue;
                }
            };

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => return self.fail(e),
            };
            let path = entry.path();

            if file_type.is_dir() {
                if self.recursive {
                    self.pending.push_back(path);
                }
                continue;
            }

            // Symlinks are followed for the file/dir decision only.
            if file_type.is_symlink() && path.is_dir() {
                continue;
            }

            if is_markdown_name(&entry.file_name().to_string_lossy()) {
                return Some(Ok(path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.md"), "# A").unwrap();
        fs::write(root.join("b.markdown"), "# B").unwrap();
        fs::write(root.join("c.txt"), "not markdown").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("d.md"), "# D").unwrap();
        // A directory whose name matches the glob must not be returned.
        fs::create_dir(root.join("dir.md")).unwrap();
        dir
    }

    fn relative_set(root: &Path, paths: Vec<PathBuf>) -> BTreeSet<PathBuf> {
        paths
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect()
    }

    #[test]
    fn test_non_recursive_scan() {
        let dir = fixture();
        let found = find_markdown_files(dir.path(), false).unwrap();
        let expected: BTreeSet<PathBuf> = ["a.md", "b.markdown"].iter().map(PathBuf::from).collect();
        assert_eq!(relative_set(dir.path(), found), expected);
    }

    #[test]
    fn test_recursive_scan() {
        let dir = fixture();
        let found = find_markdown_files(dir.path(), true).unwrap();
        let expected: BTreeSet<PathBuf> = ["a.md", "b.markdown", "sub/d.md"]
            .iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(relative_set(dir.path(), found), expected);
    }

    #[test]
    fn test_scan_is_lazy_and_finite() {
        let dir = fixture();
        let mut scan = MarkdownScan::new(dir.path(), false);
        assert!(scan.next().is_some());
        assert!(scan.next().is_some());
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
    }

    #[test]
    fn test_scan_missing_root_errors_once() {
        let dir = TempDir::new().unwrap();
        let mut scan = MarkdownScan::new(dir.path().join("nope"), true);
        assert!(matches!(scan.next(), Some(Err(_))));
        assert!(scan.next().is_none());
    }

    #[test]
    fn test_glob_is_case_sensitive() {
        assert!(is_markdown_name("a.md"));
        assert!(is_markdown_name("notes.markdown"));
        assert!(is_markdown_name(".md"));
        assert!(!is_markdown_name("A.MD"));
        assert!(!is_markdown_name("a.mdx"));
        assert!(!is_markdown_name("c.txt"));
    }

    #[test]
    fn test_identifier_strips_final_extension() {
        assert_eq!(identifier_for(Path::new("docs/notes.v2.md")), "notes.v2");
        assert_eq!(identifier_for(Path::new("README.markdown")), "README");
    }

    #[test]
    fn test_empty_scan_is_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("c.txt"), "x").unwrap();
        let config = ConversionConfig::builder().scan_root(dir.path()).build().unwrap();
        let err = resolve_inputs(&config, io::empty()).unwrap_err();
        assert!(matches!(err, MarkoutError::NoMarkdownFiles { .. }));
    }

    #[test]
    fn test_missing_explicit_file_fails_in_turn() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.md");
        fs::write(&good, "# ok").unwrap();
        let config = ConversionConfig::builder()
            .files([good, dir.path().join("missing.md"), dir.path().join("after.md")])
            .build()
            .unwrap();
        let mut docs = resolve_inputs(&config, io::empty()).unwrap();
        assert_eq!(docs.expected_len(), Some(3));

        assert_eq!(docs.next().unwrap().unwrap().identifier, "good");
        let err = docs.next().unwrap().unwrap_err();
        assert!(matches!(err, MarkoutError::FileNotFound { .. }));
        assert!(docs.next().is_none(), "sequence ends after the first error");
    }

    #[test]
    fn test_explicit_files_keep_argument_order() {
        let dir = TempDir::new().unwrap();
        let z = dir.path().join("z.md");
        let a = dir.path().join("a.md");
        fs::write(&z, "z").unwrap();
        fs::write(&a, "a").unwrap();
        let config = ConversionConfig::builder().files([&z, &a]).build().unwrap();
        let docs: Vec<_> = resolve_inputs(&config, io::empty())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d: &SourceDocument| d.identifier.as_str()).collect();
        assert_eq!(ids, ["z", "a"]);
    }

    #[test]
    fn test_scan_reads_files_on_demand() {
        let dir = fixture();
        let config = ConversionConfig::builder()
            .scan_root(dir.path())
            .recursive(true)
            .build()
            .unwrap();
        let mut docs = resolve_inputs(&config, io::empty()).unwrap();
        assert_eq!(docs.expected_len(), None);

        // Files not reached yet are read with their current contents.
        let first = docs.next().unwrap().unwrap();
        for name in ["a.md", "b.markdown", "sub/d.md"] {
            let p = dir.path().join(name);
            if Some(p.as_path()) != first.path.as_deref() {
                fs::write(p, "changed").unwrap();
            }
        }
        let rest: Vec<SourceDocument> = docs.collect::<Result<_, _>>().unwrap();
        assert_eq!(rest.len(), 2);
        assert!(rest.iter().all(|d| d.text() == "changed"));
    }

    #[test]
    fn test_stdin_document() {
        let config = ConversionConfig::builder().stdin(true).build().unwrap();
        let mut docs = resolve_inputs(&config, "# Test\nThis is a test.".as_bytes()).unwrap();
        assert_eq!(docs.expected_len(), Some(1));
        let doc = docs.next().unwrap().unwrap();
        assert_eq!(doc.identifier, "MarkOut");
        assert_eq!(doc.path, None);
        assert_eq!(doc.text(), "# Test\nThis is a test.");
        assert!(docs.next().is_none());
    }

    #[test]
    fn test_empty_stdin_is_not_an_error() {
        let doc = read_stdin(io::empty()).unwrap();
        assert!(doc.raw.is_empty());
    }
}
