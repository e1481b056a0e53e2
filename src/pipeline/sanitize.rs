//! Optional HTML sanitization of the rendered fragment (`--sanitize`).
//!
//! Runs before assembly, so only the Markdown-derived body is filtered; the
//! envelope and the CSS fragment are produced by this crate and left alone.

/// HTML → sanitized HTML capability.
pub trait HtmlSanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

/// Pass-through to `ammonia` with its default allow-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmmoniaSanitizer;

impl HtmlSanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        ammonia::clean(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_keeps_markup() {
        let out = AmmoniaSanitizer.sanitize("<p>hi<script>alert(1)</script></p>");
        assert!(out.contains("<p>hi"));
        assert!(!out.contains("script"));
    }
}
