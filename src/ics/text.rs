//! Text normalization for ICS field values: backslash-escape unescaping and
//! a fixed set of HTML entities, since the feed often carries pasted markup.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BREAK_RE: Regex = Regex::new(r"(?i)<br\s*/?>|</p>").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Decode the fixed entity set, matching names case-insensitively.
/// Unknown entities are left untouched.
fn decode_html_entities(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match ENTITIES.iter().find(|(entity, _)| {
            tail.get(..entity.len())
                .is_some_and(|s| s.eq_ignore_ascii_case(entity))
        }) {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Unescape the ICS separator escapes. Escaped newlines become `newline`,
/// which differs between one-line titles and multi-line descriptions.
fn unescape(value: &str, newline: &str) -> String {
    value
        .replace("\\n", newline)
        .replace("\\,", ",")
        .replace("\\;", ";")
}

/// Normalize a SUMMARY value into single-line display text.
pub fn normalize_title(raw: &str) -> String {
    let unescaped = unescape(raw, " ");
    let collapsed = WHITESPACE_RE.replace_all(&unescaped, " ");
    decode_html_entities(collapsed.trim())
}

/// Normalize a DESCRIPTION value into multi-line display text: line-break
/// markup becomes newlines, other tags are stripped, blank lines dropped.
pub fn normalize_description(raw: &str) -> String {
    let unescaped = unescape(raw, "\n");
    let broken = BREAK_RE.replace_all(&unescaped, "\n");
    let stripped = TAG_RE.replace_all(&broken, "");
    let decoded = decode_html_entities(&stripped);

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_html_entities() {
        assert_eq!(decode_html_entities("Fish &amp; Chips"), "Fish & Chips");
        assert_eq!(decode_html_entities("&lt;b&gt;&quot;hi&quot;&#39;"), "<b>\"hi\"'");
        assert_eq!(decode_html_entities("a&nbsp;b"), "a b");
        // Case-insensitive names, unknown entities untouched
        assert_eq!(decode_html_entities("&AMP;&bogus;"), "&&bogus;");
        assert_eq!(decode_html_entities("no entities"), "no entities");
        // Trailing ampersand must not be dropped
        assert_eq!(decode_html_entities("AT&T &"), "AT&T &");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("Open\\nMic\\, vol. 2"), "Open Mic, vol. 2");
        assert_eq!(normalize_title("  spaced   \t out  "), "spaced out");
        assert_eq!(normalize_title("Drinks &amp; Talks\\;"), "Drinks & Talks;");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn test_normalize_description_breaks_and_entities() {
        let out = normalize_description("Line1\\nLine2<br>Line3&amp;Co");
        assert_eq!(out, "Line1\nLine2\nLine3&Co");
    }

    #[test]
    fn test_normalize_description_strips_markup() {
        let out = normalize_description("<p>Hello <b>world</b></p><p>again</p>");
        assert_eq!(out, "Hello world\nagain");

        let out = normalize_description("one<br/>two<BR >three");
        assert_eq!(out, "one\ntwo\nthree");
    }

    #[test]
    fn test_normalize_description_drops_blank_lines() {
        let out = normalize_description("  first \\n\\n  \\n second ");
        assert_eq!(out, "first\nsecond");
    }
}
