use std::sync::LazyLock;

use regex::Regex;

pub mod document;
pub mod field;
pub mod filter;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Escape text for embedding in HTML element or attribute context. Every
/// user-supplied string goes through here before it touches the document.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert newlines in already-escaped text to `<br>`.
pub fn newlines_to_br(escaped: &str) -> String {
    escaped.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Drop HTML tags, keeping the text between them. Used for log previews of
/// outgoing mail, not for sanitization.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}
