//! Style resolution: theme, custom stylesheet and link choices → one CSS fragment.
//!
//! The fragment is spliced verbatim into `<head>` by
//! [`crate::pipeline::assemble`]. Contributions are additive and always
//! emitted in the same order:
//!
//! ```text
//! 1. theme block     <style> built-in stylesheet </style>
//! 2. custom block    <style> contents of --style </style>
//! 3. link tag(s)     <link rel="stylesheet" href="…">
//! ```
//!
//! The built-in default (`pandoc`) only applies when the theme is unset or
//! `none` and nothing else styles the page. Problems never abort a run: an
//! unknown theme or unreadable stylesheet drops that contribution and
//! records a [`StyleWarning`].

use crate::config::{LinkPreset, StyleLink, StyleSelection, Theme};
use crate::error::StyleWarning;
use std::fs;
use tracing::{debug, warn};

/// Built-in pandoc-like reading stylesheet (also the default theme).
pub const PANDOC_CSS: &str = include_str!("../../assets/themes/pandoc.min.css");

/// Built-in monospace stylesheet.
pub const RETRO_CSS: &str = include_str!("../../assets/themes/retro.min.css");

/// The resolved CSS fragment plus any degradations on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleFragment {
    pub css: String,
    pub warnings: Vec<StyleWarning>,
}

/// One `<link>` tag emitted for a preset.
struct LinkTag {
    comment: Option<&'static str>,
    href: &'static str,
    anonymous: bool,
}

impl LinkTag {
    const fn cdn(href: &'static str) -> Self {
        Self {
            comment: None,
            href,
            anonymous: true,
        }
    }

    const fn plain(comment: &'static str, href: &'static str) -> Self {
        Self {
            comment: Some(comment),
            href,
            anonymous: false,
        }
    }
}

const BULMA: &[LinkTag] = &[LinkTag::cdn(
    "https://cdn.jsdelivr.net/npm/bulma@0.9.4/css/bulma.min.css",
)];
const BOOTSTRAP: &[LinkTag] = &[LinkTag::cdn(
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css",
)];
const TACHYONS: &[LinkTag] = &[LinkTag::cdn(
    "https://unpkg.com/tachyons@4.12.0/css/tachyons.min.css",
)];
const MILLIGRAM: &[LinkTag] = &[
    LinkTag::plain(
        "Google Fonts",
        "https://fonts.googleapis.com/css?family=Roboto:300,300italic,700,700italic",
    ),
    LinkTag::plain(
        "CSS Reset",
        "https://cdnjs.cloudflare.com/ajax/libs/normalize/8.0.1/normalize.css",
    ),
    LinkTag::plain(
        "Milligram CSS",
        "https://cdnjs.cloudflare.com/ajax/libs/milligram/1.4.1/milligram.css",
    ),
];
const PURE: &[LinkTag] = &[LinkTag::cdn(
    "https://cdn.jsdelivr.net/npm/purecss@3.0.0/build/pure-min.css",
)];
const WING: &[LinkTag] = &[LinkTag::cdn("https://unpkg.com/wingcss")];
const PICO: &[LinkTag] = &[LinkTag::cdn(
    "https://cdn.jsdelivr.net/npm/@picocss/pico@1/css/pico.min.css",
)];

fn preset_tags(preset: LinkPreset) -> &'static [LinkTag] {
    match preset {
        LinkPreset::Bulma => BULMA,
        LinkPreset::Bootstrap => BOOTSTRAP,
        LinkPreset::Tachyons => TACHYONS,
        LinkPreset::Milligram => MILLIGRAM,
        LinkPreset::Pure => PURE,
        LinkPreset::Wing => WING,
        LinkPreset::Pico => PICO,
    }
}

/// The CDN URLs a preset expands to, in emission order.
pub fn preset_urls(preset: LinkPreset) -> Vec<&'static str> {
    preset_tags(preset).iter().map(|t| t.href).collect()
}

/// Resolve a style selection into the `<head>` CSS fragment.
pub fn resolve_style(selection: &StyleSelection) -> StyleFragment {
    let mut fragment = StyleFragment::default();

    // 1. Theme
    match theme_stylesheet(selection) {
        Ok(Some(css)) => push_style_block(&mut fragment.css, "    ", css),
        Ok(None) => {}
        Err(w) => {
            warn!("{}", w);
            fragment.warnings.push(w);
        }
    }

    // 2. Custom stylesheet
    if let Some(ref path) = selection.custom_css {
        match fs::read_to_string(path) {
            Ok(css) => {
                debug!("Embedding custom stylesheet {}", path.display());
                push_style_block(&mut fragment.css, "", &css);
            }
            Err(e) => {
                let w = StyleWarning::CustomCssUnreadable {
                    path: path.clone(),
                    detail: e.to_string(),
                };
                warn!("{}", w);
                fragment.warnings.push(w);
            }
        }
    }

    // 3. External link
    match &selection.link {
        StyleLink::None => {}
        StyleLink::Preset(preset) => {
            for tag in preset_tags(*preset) {
                push_link_tag(&mut fragment.css, tag.comment, tag.href, tag.anonymous);
            }
        }
        StyleLink::Url(url) => push_link_tag(&mut fragment.css, None, url, true),
    }

    fragment
}

/// Pick the built-in stylesheet for the theme, if any.
fn theme_stylesheet(selection: &StyleSelection) -> Result<Option<&'static str>, StyleWarning> {
    let unstyled = selection.custom_css.is_none() && selection.link == StyleLink::None;
    match &selection.theme {
        Theme::Unset | Theme::None if unstyled => Ok(Some(PANDOC_CSS)),
        Theme::Unset | Theme::None | Theme::Blank => Ok(None),
        Theme::Pandoc => Ok(Some(PANDOC_CSS)),
        Theme::Retro => Ok(Some(RETRO_CSS)),
        Theme::Invalid(name) => Err(StyleWarning::UnknownTheme { name: name.clone() }),
    }
}

fn push_style_block(out: &mut String, body_indent: &str, css: &str) {
    out.push_str("    <style>\n");
    out.push_str(body_indent);
    out.push_str(css.trim_end());
    out.push_str("\n    </style>\n");
}

fn push_link_tag(out: &mut String, comment: Option<&str>, href: &str, anonymous: bool) {
    if let Some(c) = comment {
        out.push_str(&format!("    <!-- {c} -->\n"));
    }
    if anonymous {
        out.push_str(&format!(
            "    <link rel=\"stylesheet\" href=\"{href}\" crossorigin=\"anonymous\" referrerpolicy=\"no-referrer\" />\n"
        ));
    } else {
        out.push_str(&format!("    <link rel=\"stylesheet\" href=\"{href}\">\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn selection(theme: Theme, custom_css: Option<PathBuf>, link: StyleLink) -> StyleSelection {
        StyleSelection {
            theme,
            custom_css,
            link,
        }
    }

    #[test]
    fn test_default_theme_when_nothing_selected() {
        let f = resolve_style(&StyleSelection::default());
        assert!(f.css.contains(PANDOC_CSS.trim_end()));
        assert_eq!(f.css.matches("<style>").count(), 1);
        assert!(f.warnings.is_empty());

        let f = resolve_style(&selection(Theme::None, None, StyleLink::None));
        assert!(f.css.contains(PANDOC_CSS.trim_end()));
    }

    #[test]
    fn test_no_default_when_link_given() {
        let f = resolve_style(&selection(
            Theme::Unset,
            None,
            StyleLink::Preset(LinkPreset::Bulma),
        ));
        assert!(!f.css.contains("<style>"));
        assert!(f.css.contains("bulma@0.9.4"));
    }

    #[test]
    fn test_blank_suppresses_builtin() {
        let f = resolve_style(&selection(Theme::Blank, None, StyleLink::None));
        assert!(f.css.is_empty());
        assert!(f.warnings.is_empty());
    }

    #[test]
    fn test_retro_theme() {
        let f = resolve_style(&selection(Theme::Retro, None, StyleLink::None));
        assert!(f.css.contains(RETRO_CSS.trim_end()));
        assert!(!f.css.contains(PANDOC_CSS.trim_end()));
    }

    #[test]
    fn test_invalid_theme_warns_and_continues() {
        let f = resolve_style(&selection(
            Theme::Invalid("dark".into()),
            None,
            StyleLink::Url("https://example.com/a.css".into()),
        ));
        assert_eq!(
            f.warnings,
            vec![StyleWarning::UnknownTheme {
                name: "dark".into()
            }]
        );
        assert!(!f.css.contains("<style>"));
        assert!(f.css.contains("href=\"https://example.com/a.css\""));
    }

    #[test]
    fn test_contributions_are_additive_and_ordered() {
        let dir = tempfile::TempDir::new().unwrap();
        let css_path = dir.path().join("site.css");
        fs::write(&css_path, "body { color: red; }\n").unwrap();

        let f = resolve_style(&selection(
            Theme::Retro,
            Some(css_path),
            StyleLink::Preset(LinkPreset::Pico),
        ));
        let theme_at = f.css.find(RETRO_CSS.trim_end()).unwrap();
        let custom_at = f.css.find("body { color: red; }").unwrap();
        let link_at = f.css.find("pico.min.css").unwrap();
        assert!(theme_at < custom_at && custom_at < link_at);
        assert_eq!(f.css.matches("<style>").count(), 2);
    }

    #[test]
    fn test_unreadable_custom_css_is_omitted() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.css");
        let f = resolve_style(&selection(Theme::Blank, Some(missing.clone()), StyleLink::None));
        assert!(f.css.is_empty());
        assert!(matches!(
            &f.warnings[..],
            [StyleWarning::CustomCssUnreadable { path, .. }] if *path == missing
        ));
    }

    #[test]
    fn test_milligram_expands_to_three_links() {
        let f = resolve_style(&selection(
            Theme::Blank,
            None,
            StyleLink::Preset(LinkPreset::Milligram),
        ));
        assert_eq!(f.css.matches("<link ").count(), 3);
        assert!(f.css.contains("<!-- Milligram CSS -->"));
        assert_eq!(preset_urls(LinkPreset::Milligram).len(), 3);
    }

    #[test]
    fn test_literal_url_is_not_validated() {
        let f = resolve_style(&selection(
            Theme::Blank,
            None,
            StyleLink::Url("styles/local.css".into()),
        ));
        assert_eq!(
            f.css,
            "    <link rel=\"stylesheet\" href=\"styles/local.css\" crossorigin=\"anonymous\" referrerpolicy=\"no-referrer\" />\n"
        );
    }

    #[test]
    fn test_every_preset_has_a_url() {
        for preset in LinkPreset::ALL {
            assert!(!preset_urls(preset).is_empty(), "{preset:?}");
        }
    }

    #[test]
    fn test_builtin_themes_are_minified() {
        for css in [PANDOC_CSS, RETRO_CSS] {
            let body = css.trim_end();
            assert!(!body.is_empty());
            assert!(!body.contains('\n'));
            assert!(!body.contains("/*"));
            assert!(!body.contains("  "));
        }
    }
}
