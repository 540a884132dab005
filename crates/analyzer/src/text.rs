//! Text helpers for notification rendering.

use lazy_static::lazy_static;
use regex::Regex;
use tera::escape_html;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]+>").expect("tag pattern is valid");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace pattern is valid");
    static ref NUMBERED: Regex =
        Regex::new(r"^\d+[.)]\s*(.*)$").expect("numbered line pattern is valid");
}

/// Flatten text to one line: drop markup tags and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let mut flat = text.replace(['\n', '\r'], " ");

    // Repeat until no tag remains so cleaning twice changes nothing
    while TAG.is_match(&flat) {
        flat = TAG.replace_all(&flat, "").into_owned();
    }

    WHITESPACE.replace_all(&flat, " ").trim().to_string()
}

/// Render solution text as escaped HTML: numbered steps become an ordered list.
pub fn format_html_text(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match NUMBERED.captures(line) {
            Some(caps) => {
                if !in_list {
                    html.push_str("<ol>");
                    in_list = true;
                }
                let item = caps.get(1).map_or("", |m| m.as_str());
                html.push_str(&format!("<li>{}</li>", escape_html(item)));
            }
            None => {
                if in_list {
                    html.push_str("</ol>");
                    in_list = false;
                }
                html.push_str(&format!("<p>{}</p>", escape_html(line)));
            }
        }
    }

    if in_list {
        html.push_str("</ol>");
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("<h1>Hello\nWorld</h1>  with   multiple    spaces"),
            "Hello World with multiple spaces"
        );
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("\r\n  \t"), "");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        for input in [
            "<h1>Hello\nWorld</h1>  with   multiple    spaces",
            "<<b>i>nested</i>",
            "a < b and c > d",
            "plain",
        ] {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_numbered_steps_become_list() {
        let html = format_html_text("Do this first:\n1. Restart the pod\n2) Raise the <limit>\nThen watch.");
        assert_eq!(
            html,
            "<p>Do this first:</p><ol><li>Restart the pod</li><li>Raise the &lt;limit&gt;</li></ol><p>Then watch.</p>"
        );
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(format_html_text("a & b"), "<p>a &amp; b</p>");
        assert_eq!(format_html_text(""), "");
    }
}
