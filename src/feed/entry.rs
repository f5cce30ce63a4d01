// src/feed/entry.rs

//! Feed entry classification
//!
//! A feed line is a comma separated list. Only the last three fields carry
//! meaning (`channel`, `product`, `version`); earlier fields identify the
//! owning product and may themselves contain commas. The first field decides
//! what kind of entry the line is.

use std::fmt;
use tracing::warn;

/// Wildcard channel id used by the feed
pub const ALL_CHANNELS: &str = "ALL";

/// First field marking a revocation entry
const REVOKE_MARKER: &str = "REVOKE";

/// Prefix of multi-component bundle announcements
const COMBO_PREFIX: &str = "COMBO";

/// Prefix of feature entries
const FEATURE_PREFIX: &str = "FEATURE";

/// Parse-time filtering options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop entries whose first field starts with `FEATURE`
    pub discard_feature_entries: bool,
}

/// Channel a revocation applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelScope {
    /// Every channel (`ALL` in the feed)
    All,
    /// One concrete channel id
    Channel(String),
}

impl ChannelScope {
    fn from_field(field: &str) -> Self {
        if field == ALL_CHANNELS {
            ChannelScope::All
        } else {
            ChannelScope::Channel(field.to_string())
        }
    }

    /// Channel id as it appeared in the feed
    pub fn as_str(&self) -> &str {
        match self {
            ChannelScope::All => ALL_CHANNELS,
            ChannelScope::Channel(id) => id,
        }
    }
}

impl fmt::Display for ChannelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified feed entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEntry {
    /// A product version offered on a channel
    Announcement {
        channel: String,
        product: String,
        version: String,
    },
    /// A product version withdrawn from one channel or from all of them
    Revocation {
        scope: ChannelScope,
        product: String,
        version: String,
    },
}

/// Why a raw line produced no entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    Combo,
    Feature,
    TooFewFields,
}

impl FeedEntry {
    /// Classify a single raw feed line
    pub fn classify(line: &str, options: &ParseOptions) -> Result<Self, Discard> {
        let fields: Vec<&str> = line.split(',').collect();
        let first = fields[0];

        if first.starts_with(COMBO_PREFIX) {
            return Err(Discard::Combo);
        }
        if options.discard_feature_entries && first.starts_with(FEATURE_PREFIX) {
            return Err(Discard::Feature);
        }

        let n = fields.len();
        if n < 3 {
            return Err(Discard::TooFewFields);
        }

        let channel = fields[n - 3];
        let product = fields[n - 2].to_string();
        let version = fields[n - 1].to_string();

        if first == REVOKE_MARKER {
            Ok(FeedEntry::Revocation {
                scope: ChannelScope::from_field(channel),
                product,
                version,
            })
        } else {
            Ok(FeedEntry::Announcement {
                channel: channel.to_string(),
                product,
                version,
            })
        }
    }

    /// Raw channel field (`ALL` for wildcard revocations)
    pub fn channel_id(&self) -> &str {
        match self {
            FeedEntry::Announcement { channel, .. } => channel,
            FeedEntry::Revocation { scope, .. } => scope.as_str(),
        }
    }

    pub fn product(&self) -> &str {
        match self {
            FeedEntry::Announcement { product, .. } | FeedEntry::Revocation { product, .. } => {
                product
            }
        }
    }

    pub fn version(&self) -> &str {
        match self {
            FeedEntry::Announcement { version, .. } | FeedEntry::Revocation { version, .. } => {
                version
            }
        }
    }

    /// Whether this line itself was a `REVOKE` entry
    pub fn is_revocation(&self) -> bool {
        matches!(self, FeedEntry::Revocation { .. })
    }

    /// Whether this entry speaks about `channel`, directly or through `ALL`
    pub fn applies_to(&self, channel: &str) -> bool {
        let own = self.channel_id();
        own == channel || own == ALL_CHANNELS
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedEntry::Announcement {
                channel,
                product,
                version,
            } => write!(f, "{},{},{}", channel, product, version),
            FeedEntry::Revocation {
                scope,
                product,
                version,
            } => write!(f, "REVOKE,{},{},{}", scope, product, version),
        }
    }
}

/// Classify every raw line, dropping discarded ones and keeping feed order
pub fn parse_entries<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Vec<FeedEntry> {
    let mut entries = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.as_ref();
        match FeedEntry::classify(line, options) {
            Ok(entry) => entries.push(entry),
            Err(Discard::TooFewFields) => {
                warn!("Skipping malformed feed entry (fewer than 3 fields): {}", line);
            }
            Err(Discard::Combo) | Err(Discard::Feature) => {}
        }
    }
    entries
}
