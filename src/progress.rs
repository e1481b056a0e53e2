//! Progress-callback trait for per-document conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the converter works through its inputs. The CLI uses this to
//! drive a terminal progress bar; library callers can forward the events
//! anywhere without the converter knowing how they are displayed.
//!
//! # Example
//!
//! ```rust
//! use markout::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, _total: Option<usize>, output: Option<&Path>, bytes: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("#{} done ({} bytes) -> {:?}", index, bytes, output);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the converter as it processes each document.
///
/// Documents are processed one at a time, so events for a run arrive in
/// order. Implementations are still `Send + Sync` so a callback can be
/// shared with other threads (e.g. a progress-bar ticker).
/// All methods have default no-op implementations.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after inputs are resolved, before any document is read.
    ///
    /// `total_documents` is `None` when the inputs come from a directory
    /// scan, which is walked as the run goes.
    fn on_run_start(&self, total_documents: Option<usize>) {
        let _ = total_documents;
    }

    /// Called before a document is rendered.
    ///
    /// # Arguments
    /// * `index`      — 1-indexed position in the run
    /// * `total`      — number of documents in the run, if known
    /// * `identifier` — source identifier (file stem or `MarkOut`)
    fn on_document_start(&self, index: usize, total: Option<usize>, identifier: &str) {
        let _ = (index, total, identifier);
    }

    /// Called when a document has been written.
    ///
    /// `output` is `None` for stdout output; `bytes` is the HTML length.
    fn on_document_complete(
        &self,
        index: usize,
        total: Option<usize>,
        output: Option<&Path>,
        bytes: usize,
    ) {
        let _ = (index, total, output, bytes);
    }

    /// Called when a document fails to read, convert or write. The run
    /// stops after this event.
    fn on_document_error(&self, index: usize, total: Option<usize>, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after the last document, only when the whole run succeeded.
    fn on_run_complete(&self, converted: usize) {
        let _ = converted;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
