// src/feed/mod.rs

//! Adobe AAM updater feed handling
//!
//! This module provides:
//! - Bracket scraping of the raw feed document
//! - Classification of feed lines into announcements and revocations
//! - Revocation counting and latest-version resolution per channel
//!
//! Nothing in here performs I/O; the feed text is supplied by the caller.

mod entry;
mod resolver;
mod scrape;

pub use entry::{ALL_CHANNELS, ChannelScope, Discard, FeedEntry, ParseOptions, parse_entries};
pub use resolver::{FeedResolver, highest_version, is_revoked, revocation_count};
pub use scrape::extract_bracketed;

/// Feed document path relative to the feed base URL
pub const FEED_PATH: &str = "webfeed/oobe/aam20/mac/updaterfeed.xml";

/// Scrape and parse a full feed document
pub fn parse_feed(text: &str, options: &ParseOptions) -> FeedResolver {
    let lines = extract_bracketed(text);
    FeedResolver::parse(&lines, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_end_to_end() {
        let text = r#"<?xml version="1.0"?>
<COMBO,AdobePhotoshopCS6,AdobeBridge5,ALL,AdobeCombo,1.0>
<AdobePhotoshopCS6-13.0,AdobePhotoshop13-mul,AdobePhotoshop13.0.1,13.0.1>
<REVOKE,ALL,AdobePhotoshop13.0.1,13.0.1>
"#;
        let resolver = parse_feed(text, &ParseOptions::default());
        // The xml declaration is scraped too and skipped as a short line
        assert_eq!(resolver.len(), 2);
        assert!(resolver.is_revoked("AdobePhotoshop13-mul", "AdobePhotoshop13.0.1", "13.0.1"));
    }
}
