// src/feed/scrape.rs

//! Bracket scraping for the raw updater feed
//!
//! The feed is not parsed as XML. Every `<...>` span is captured verbatim
//! (non-greedy) in document order and handed to the resolver as a line.

use regex::Regex;
use std::sync::LazyLock;

/// Content of each bracket pair, non-greedy
static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(.+?)>").unwrap());

/// Extract all bracketed strings from a feed document
pub fn extract_bracketed(text: &str) -> Vec<String> {
    BRACKET_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_in_document_order() {
        let text = "<AdobePhotoshopCS6-13.0,AdobePhotoshop13-mul,AdobePhotoshop13.0.1,13.0.1>\n\
                    <REVOKE,ALL,AdobeBridge5,5.0.1>";
        let lines = extract_bracketed(text);
        assert_eq!(
            lines,
            vec![
                "AdobePhotoshopCS6-13.0,AdobePhotoshop13-mul,AdobePhotoshop13.0.1,13.0.1",
                "REVOKE,ALL,AdobeBridge5,5.0.1",
            ]
        );
    }

    #[test]
    fn test_extract_is_non_greedy_on_one_line() {
        let lines = extract_bracketed("<a,b,c,1><d,e,f,2>");
        assert_eq!(lines, vec!["a,b,c,1", "d,e,f,2"]);
    }

    #[test]
    fn test_extract_does_not_span_lines() {
        let lines = extract_bracketed("header <broken\n tag> text <x,y,z,1> trailer");
        assert_eq!(lines, vec!["x,y,z,1"]);
    }
}
