//! Markdown rendering: Markdown text → HTML fragment.
//!
//! The conversion itself is delegated to `pulldown-cmark`. It sits behind
//! [`MarkdownRenderer`] so the converter can be exercised with a fake
//! renderer and so the assembly rules never depend on a particular engine.

use pulldown_cmark::{html, Options, Parser};

/// Markdown → HTML capability.
///
/// Implementations are pure: the same input always yields the same
/// fragment, and well-formed UTF-8 input never fails.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer backed by `pulldown-cmark`.
///
/// No dialect extensions (tables, footnotes, …) are enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct PulldownRenderer;

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Options::empty());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}
