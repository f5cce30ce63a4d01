// src/lib.rs

//! aamporter
//!
//! Mirrors Adobe Application Manager (AAM) updates for a configured set of
//! products and optionally imports them into a Munki repository.
//!
//! # Architecture
//!
//! - Feed resolution: the updater feed is scraped into announcements and
//!   revocations, and a version is current only when announcements outnumber
//!   revocations and no newer version exists on the channel
//! - Detail documents: each update's XML names its payload, size and
//!   localized strings
//! - Cache: payloads are kept flat on disk and only fetched when missing or
//!   truncated
//! - Import: payloads are handed to munkiimport as updates for the base
//!   products that subscribe to their channel

pub mod cache;
pub mod client;
pub mod config;
pub mod detail;
mod error;
pub mod feed;
pub mod import;
pub mod mirror;
pub mod version;

pub use client::{FeedClient, Transport};
pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH, Endpoints, ProductSpec};
pub use detail::{DetailError, UpdateDetail};
pub use error::{Error, Result};
pub use feed::{ChannelScope, FeedEntry, FeedResolver, ParseOptions, parse_feed};
pub use import::{ImportOutcome, ImportRequest, MunkiImporter, PackageImporter};
pub use mirror::{MirrorOptions, MirrorReport, UpdateRecord, UpdateStatus, run_mirror};
pub use version::{LooseVersion, compare_versions, max_version};
