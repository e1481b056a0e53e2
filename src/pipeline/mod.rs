//! Pipeline stages for Markdown-to-HTML conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the external engines (Markdown, sanitizer, browser) stay behind
//! small traits.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ sanitize? ──▶ assemble ──▶ write ──▶ pdf?
//!             ▲                         ▲
//!             │                       style
//! ```
//!
//! 1. [`input`]    — explicit files, directory scan, or stdin → `SourceDocument`s
//! 2. [`style`]    — theme / custom stylesheet / link → one `<head>` CSS fragment
//! 3. [`render`]   — Markdown → HTML fragment (`pulldown-cmark`)
//! 4. [`sanitize`] — optional `ammonia` pass over the fragment
//! 5. [`assemble`] — full-page envelope or bare fragment
//! 6. [`write`]    — stdout, or `<outdir>/<identifier><ext>` with overwrite policy
//! 7. [`pdf`]      — headless-browser print to `<outdir>/<identifier>.pdf`

pub mod assemble;
pub mod input;
pub mod pdf;
pub mod render;
pub mod sanitize;
pub mod style;
pub mod write;
