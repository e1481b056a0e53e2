//! Document assembly: fragment + title + CSS → final HTML bytes.
//!
//! Full-page mode wraps the fragment in a fixed HTML5 envelope with the CSS
//! fragment spliced in just before `</head>`. Fragment mode returns the
//! renderer output untouched.
//!
//! The title is inserted as-is. It comes from a file stem or the fixed
//! `MarkOut` identifier, never from document content.

const HEAD_OPEN: &str = "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n";
const HEAD_CLOSE: &str = "  </head>\n  <body>\n";
const BODY_CLOSE: &str = "  </body>\n</html>\n";

/// Assemble the output for one document.
pub fn assemble_document(fragment: &str, title: &str, css: &str, full_page: bool) -> String {
    if !full_page {
        return fragment.to_string();
    }

    let mut out = String::with_capacity(
        HEAD_OPEN.len() + title.len() + css.len() + fragment.len() + 64,
    );
    out.push_str(HEAD_OPEN);
    out.push_str("    <title>");
    out.push_str(title);
    out.push_str("</title>\n");
    out.push_str(css);
    out.push_str(HEAD_CLOSE);
    out.push_str(fragment);
    out.push_str(BODY_CLOSE);
    out
}
