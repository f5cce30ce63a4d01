// src/feed/resolver.rs

//! Revocation and latest-version resolution over a parsed feed
//!
//! The feed repeats the same product/version many times, as plain
//! announcements and as `REVOKE` entries, and never deletes old lines.
//! Whether a version is still current is decided by counting: each
//! revocation adds one, each announcement subtracts one, and the version is
//! revoked unless announcements strictly outnumber revocations. The count is
//! an aggregate over the whole feed, so a resolver is only ever built from a
//! complete feed dump and is read-only afterwards.

use tracing::debug;

use super::entry::{FeedEntry, ParseOptions, parse_entries};
use crate::version::max_version;

/// Read-only view over every entry of one feed dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedResolver {
    entries: Vec<FeedEntry>,
}

impl FeedResolver {
    /// Parse raw bracketed feed lines
    pub fn parse<S: AsRef<str>>(lines: &[S], options: &ParseOptions) -> Self {
        let entries = parse_entries(lines, options);
        debug!("Parsed {} of {} feed entries", entries.len(), lines.len());
        Self { entries }
    }

    /// Build a resolver from already classified entries
    pub fn from_entries(entries: Vec<FeedEntry>) -> Self {
        Self { entries }
    }

    /// All entries, in feed order
    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose channel field is exactly `channel`
    ///
    /// Returns `None` rather than an empty list when nothing matches.
    pub fn updates_for_channel(&self, channel: &str) -> Option<Vec<&FeedEntry>> {
        let updates: Vec<&FeedEntry> = self
            .entries
            .iter()
            .filter(|e| e.channel_id() == channel)
            .collect();
        if updates.is_empty() { None } else { Some(updates) }
    }

    /// Whether `product`/`version` counts as revoked on `channel`
    pub fn is_revoked(&self, channel: &str, product: &str, version: &str) -> bool {
        is_revoked(channel, product, version, &self.entries)
    }

    /// Whether an update passes the latest-version and revocation checks
    ///
    /// With `include_revoked` both checks are skipped. The licensing check
    /// needs the detail document and is applied by the caller.
    pub fn is_eligible(
        &self,
        channel: &str,
        product: &str,
        version: &str,
        include_revoked: bool,
    ) -> bool {
        if include_revoked {
            return true;
        }
        let Some(updates) = self.updates_for_channel(channel) else {
            return false;
        };
        if highest_version(&updates, product, false) != Some(version) {
            return false;
        }
        !self.is_revoked(channel, product, version)
    }

    /// The version the eligibility policy would offer for `product` on `channel`
    pub fn highest_resolved_version(
        &self,
        channel: &str,
        product: &str,
        include_revoked: bool,
    ) -> Option<&str> {
        let updates = self.updates_for_channel(channel)?;
        let candidate = highest_version(&updates, product, include_revoked)?;
        if include_revoked || !self.is_revoked(channel, product, candidate) {
            Some(candidate)
        } else {
            None
        }
    }
}

/// Revocation count over `entries` for one product version on one channel
///
/// Entries for the queried channel and for `ALL` are counted: +1 per
/// revocation, -1 per announcement. The result is revoked when the count is
/// greater than -1, so a version nobody announces, or one revoked as often as
/// it was announced, is revoked.
pub fn revocation_count<'a, I>(channel: &str, product: &str, version: &str, entries: I) -> i64
where
    I: IntoIterator<Item = &'a FeedEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.product() == product && e.version() == version && e.applies_to(channel))
        .map(|e| if e.is_revocation() { 1 } else { -1 })
        .sum()
}

/// See [`revocation_count`]
pub fn is_revoked<'a, I>(channel: &str, product: &str, version: &str, entries: I) -> bool
where
    I: IntoIterator<Item = &'a FeedEntry>,
{
    let count = revocation_count(channel, product, version, entries);
    debug!(
        "Revocation count for {} {} on {}: {}",
        product, version, channel, count
    );
    count > -1
}

/// Highest version of `product` among `updates`
///
/// Unless `include_revoked`, entries that are themselves `REVOKE` lines are
/// left out first. This is the per-entry flag, not [`is_revoked`].
pub fn highest_version<'a>(
    updates: &[&'a FeedEntry],
    product: &str,
    include_revoked: bool,
) -> Option<&'a str> {
    max_version(
        updates
            .iter()
            .copied()
            .filter(|e| e.product() == product)
            .filter(|e| include_revoked || !e.is_revocation())
            .map(|e| e.version()),
    )
}
