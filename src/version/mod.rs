// src/version/mod.rs

//! Loose version ordering for feed version strings
//!
//! Adobe update versions are dotted numbers with the occasional non-numeric
//! segment ("6.0.2", "7.1.71", "13.0.1-Trial"). They are not semver, so the
//! ordering here is deliberately permissive:
//!
//! - the string is split on `.`
//! - a segment is a leading run of ASCII digits plus a suffix ("1-Trial" is
//!   `1` then `-Trial`)
//! - two digit-led segments compare by number first, of any length, then by
//!   suffix as a case sensitive string
//! - a digit-led segment sorts below one with no leading digits
//! - two segments with no leading digits compare as strings, case sensitive
//! - when every shared segment is equal, more segments sort higher

use std::cmp::Ordering;
use std::fmt;

/// One dot-separated segment of a version string
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Leading digits with leading zeros stripped, and the rest
    Numeric { digits: String, suffix: String },
    Text(String),
}

impl Segment {
    fn parse(s: &str) -> Self {
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        if split == 0 {
            return Segment::Text(s.to_string());
        }
        Segment::Numeric {
            digits: s[..split].trim_start_matches('0').to_string(),
            suffix: s[split..].to_string(),
        }
    }

    fn compare(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (
                Segment::Numeric { digits: a, suffix: sa },
                Segment::Numeric { digits: b, suffix: sb },
            ) => a
                .len()
                .cmp(&b.len())
                .then_with(|| a.cmp(b))
                .then_with(|| sa.cmp(sb)),
            (Segment::Numeric { .. }, Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Numeric { .. }) => Ordering::Greater,
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
        }
    }
}

/// A version string with loose dotted ordering
#[derive(Debug, Clone)]
pub struct LooseVersion {
    raw: String,
    segments: Vec<Segment>,
}

impl LooseVersion {
    /// Parse a version string. Never fails; any string has a loose ordering.
    pub fn parse(s: &str) -> Self {
        Self {
            raw: s.to_string(),
            segments: s.split('.').map(Segment::parse).collect(),
        }
    }

    /// The original version string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compare two loose versions
    pub fn compare(&self, other: &LooseVersion) -> Ordering {
        for (a, b) in self.segments.iter().zip(other.segments.iter()) {
            match a.compare(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for LooseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for LooseVersion {}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two version strings under loose ordering
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    LooseVersion::parse(a).compare(&LooseVersion::parse(b))
}

/// Pick the highest version string; equal versions keep the first seen
pub fn max_version<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, LooseVersion)> = None;
    for candidate in versions {
        let parsed = LooseVersion::parse(candidate);
        let replace = match &best {
            Some((_, current)) => parsed.compare(current) == Ordering::Greater,
            None => true,
        };
        if replace {
            best = Some((candidate, parsed));
        }
    }
    best.map(|(raw, _)| raw)
}
