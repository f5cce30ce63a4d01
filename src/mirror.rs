// src/mirror.rs

//! A full mirror run
//!
//! Walks every configured product's channels, decides which updates are
//! current, fetches their detail documents, fills the local cache and hands
//! the payloads to an importer. Only failing to obtain the feed aborts the
//! run; every other failure is recorded against the update it belongs to.

use crate::cache::{self, CacheOutcome};
use crate::client::Transport;
use crate::config::{Config, Endpoints};
use crate::detail::{self, UpdateDetail};
use crate::error::{Error, Result};
use crate::feed::{self, FeedResolver, highest_version};
use crate::import::{ImportOutcome, ImportRequest, PackageImporter, item_name};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Switches for one mirror run
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    /// Skip the latest-version and revocation checks
    pub include_revoked: bool,
    /// Keep updates of the excluded licensing class
    pub include_all_licensing: bool,
    /// Resolve and fetch detail documents but download nothing
    pub dry_run: bool,
    /// Read the feed from this file instead of the server
    pub feed_file: Option<PathBuf>,
}

/// What happened to one update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    NotLatest,
    Revoked,
    LicensingExcluded,
    DetailUnavailable(String),
    /// Would be downloaded (dry run)
    Planned,
    Cached,
    Downloaded,
    Redownloaded,
    Imported,
    AlreadyImported,
    Failed(String),
}

impl UpdateStatus {
    /// The update was filtered out before any download
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::NotLatest | Self::Revoked | Self::LicensingExcluded)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::DetailUnavailable(_) | Self::Failed(_))
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLatest => write!(f, "not latest"),
            Self::Revoked => write!(f, "revoked"),
            Self::LicensingExcluded => write!(f, "licensing excluded"),
            Self::DetailUnavailable(reason) => write!(f, "detail unavailable: {}", reason),
            Self::Planned => write!(f, "planned"),
            Self::Cached => write!(f, "cached"),
            Self::Downloaded => write!(f, "downloaded"),
            Self::Redownloaded => write!(f, "re-downloaded"),
            Self::Imported => write!(f, "imported"),
            Self::AlreadyImported => write!(f, "already imported"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

impl From<CacheOutcome> for UpdateStatus {
    fn from(outcome: CacheOutcome) -> Self {
        match outcome {
            CacheOutcome::Cached => Self::Cached,
            CacheOutcome::Downloaded => Self::Downloaded,
            CacheOutcome::Redownloaded => Self::Redownloaded,
        }
    }
}

/// Outcome for one `(channel, product, version)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    pub channel: String,
    pub product: String,
    pub version: String,
    pub status: UpdateStatus,
}

/// Everything a mirror run did, in processing order
#[derive(Debug, Clone, Default)]
pub struct MirrorReport {
    pub records: Vec<UpdateRecord>,
}

impl MirrorReport {
    /// Records that were neither filtered out nor failed
    pub fn processed(&self) -> impl Iterator<Item = &UpdateRecord> {
        self.records
            .iter()
            .filter(|r| !r.status.is_skipped() && !r.status.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &UpdateRecord> {
        self.records.iter().filter(|r| r.status.is_failure())
    }

    pub fn count(&self, status: &UpdateStatus) -> usize {
        self.records.iter().filter(|r| &r.status == status).count()
    }
}

/// Obtain and parse the feed, from `options.feed_file` or the server
pub fn load_feed(
    config: &Config,
    options: &MirrorOptions,
    transport: &dyn Transport,
) -> Result<FeedResolver> {
    let text = match &options.feed_file {
        Some(path) => {
            info!("Reading feed from {}", path.display());
            std::fs::read_to_string(path).map_err(|e| {
                Error::IoError(format!("Failed to read feed file {}: {e}", path.display()))
            })?
        }
        None => {
            let endpoints = config.endpoints()?;
            info!("Fetching feed from {}", endpoints.feed_url);
            transport.fetch_text(&endpoints.feed_url)?
        }
    };

    let resolver = feed::parse_feed(&text, &config.parse_options());
    info!("Feed has {} entries", resolver.len());
    Ok(resolver)
}

/// Run a full mirror pass
pub fn run_mirror(
    config: &Config,
    options: &MirrorOptions,
    transport: &dyn Transport,
    importer: Option<&dyn PackageImporter>,
) -> Result<MirrorReport> {
    let endpoints = config.endpoints()?;
    if !options.dry_run {
        cache::prepare_cache_dir(&config.local_cache_path)?;
    }

    let resolver = load_feed(config, options, transport)?;
    let run = MirrorRun {
        config,
        options,
        transport,
        importer,
        endpoints: &endpoints,
        resolver: &resolver,
    };

    let mut report = MirrorReport::default();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();

    for product in &config.products {
        info!("Processing product {}", product.name);
        for channel in &product.channels {
            let Some(updates) = resolver.updates_for_channel(channel) else {
                info!("No updates for channel {}", channel);
                continue;
            };

            for entry in &updates {
                let key = (
                    channel.clone(),
                    entry.product().to_string(),
                    entry.version().to_string(),
                );
                if !seen.insert(key) {
                    continue;
                }

                let status = run.process(channel, &updates, entry.product(), entry.version());
                if status.is_failure() {
                    warn!(
                        "{} {} on {}: {}",
                        entry.product(),
                        entry.version(),
                        channel,
                        status
                    );
                }
                report.records.push(UpdateRecord {
                    channel: channel.clone(),
                    product: entry.product().to_string(),
                    version: entry.version().to_string(),
                    status,
                });
            }
        }
    }

    info!(
        "Mirror run finished: {} updates processed, {} failed",
        report.processed().count(),
        report.failures().count()
    );
    Ok(report)
}

struct MirrorRun<'a> {
    config: &'a Config,
    options: &'a MirrorOptions,
    transport: &'a dyn Transport,
    importer: Option<&'a dyn PackageImporter>,
    endpoints: &'a Endpoints,
    resolver: &'a FeedResolver,
}

impl MirrorRun<'_> {
    fn process(
        &self,
        channel: &str,
        updates: &[&feed::FeedEntry],
        product: &str,
        version: &str,
    ) -> UpdateStatus {
        if !self.options.include_revoked {
            if highest_version(updates, product, false) != Some(version) {
                debug!("Skipping {} {}, not the latest version", product, version);
                return UpdateStatus::NotLatest;
            }
            if self.resolver.is_revoked(channel, product, version) {
                info!("Skipping {} {}, it has been revoked", product, version);
                return UpdateStatus::Revoked;
            }
        }

        let root = &self.endpoints.updates_root;
        let detail_url = detail::detail_url(root, product, version);
        let update = match self
            .transport
            .fetch_text(&detail_url)
            .and_then(|xml| UpdateDetail::parse(&xml).map_err(|e| Error::ParseError(e.to_string())))
        {
            Ok(d) => d,
            Err(e) => return UpdateStatus::DetailUnavailable(e.to_string()),
        };

        if !self.options.include_all_licensing && update.is_licensing_excluded() {
            info!(
                "Skipping {} {}, licensing type {:?} is excluded",
                product, version, update.licensing_type
            );
            return UpdateStatus::LicensingExcluded;
        }

        let dest = cache::payload_path(
            &self.config.local_cache_path,
            product,
            version,
            update.payload_extension(),
        );
        if self.options.dry_run {
            info!("Would download {} {} to {}", product, version, dest.display());
            return UpdateStatus::Planned;
        }

        let payload_url = detail::payload_url(root, product, version, &update.file_name);
        let cached = match cache::ensure_payload(self.transport, &payload_url, &dest, update.file_size)
        {
            Ok(outcome) => outcome,
            Err(e) => return UpdateStatus::Failed(e.to_string()),
        };

        let Some(importer) = self.importer else {
            return cached.into();
        };

        let request = ImportRequest {
            payload_path: dest,
            item_name: item_name(product, &self.config.pkginfo_name_suffix),
            display_name: update.display_name.clone(),
            description: update.description.clone(),
            update_for: self
                .config
                .base_products_for_channel(channel)
                .into_iter()
                .map(String::from)
                .collect(),
        };
        match importer.import(&request) {
            Ok(ImportOutcome::Imported) => UpdateStatus::Imported,
            Ok(ImportOutcome::AlreadyPresent) => UpdateStatus::AlreadyImported,
            Err(e) => UpdateStatus::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProductSpec;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    struct MapTransport {
        docs: HashMap<String, String>,
        downloads: RefCell<Vec<String>>,
    }

    impl Transport for MapTransport {
        fn fetch_text(&self, url: &str) -> Result<String> {
            self.docs
                .get(url)
                .cloned()
                .ok_or_else(|| Error::DownloadError(format!("HTTP 404 Not Found from {url}")))
        }

        fn download_file(&self, url: &str, dest_path: &Path) -> Result<u64> {
            self.downloads.borrow_mut().push(url.to_string());
            std::fs::write(dest_path, b"1234")?;
            Ok(4)
        }
    }

    const FEED_URL: &str = "http://swupmf.adobe.com/webfeed/oobe/aam20/mac/updaterfeed.xml";
    const ROOT: &str = "http://swupdl.adobe.com/updates/oobe/aam20/mac";

    fn detail_xml(name: &str, size: u64) -> String {
        format!(
            "<PatchInfo><DisplayName><en_US>Display</en_US></DisplayName>\
             <Description><en_US>Desc</en_US></Description>\
             <InstallFiles><File><Name>{name}</Name><Size>{size}</Size></File></InstallFiles></PatchInfo>"
        )
    }

    fn config(cache: &Path) -> Config {
        Config {
            local_cache_path: cache.to_path_buf(),
            products: vec![ProductSpec {
                name: "AdobeBridgeCS6".to_string(),
                channels: vec!["AdobeBridge5-mul".to_string()],
            }],
            ..Config::default()
        }
    }

    fn transport(feed: &str) -> MapTransport {
        let mut docs = HashMap::new();
        docs.insert(FEED_URL.to_string(), feed.to_string());
        docs.insert(
            format!("{ROOT}/AdobeBridge5/5.0.1/5.0.1.xml"),
            detail_xml("Bridge.dmg", 4),
        );
        MapTransport {
            docs,
            downloads: RefCell::new(Vec::new()),
        }
    }

    const FEED: &str = "<AdobeBridgeCS6,AdobeBridge5-mul,AdobeBridge5,5.0.1>\n\
                        <AdobeBridgeCS6,AdobeBridge5-mul,AdobeBridge5,5.0>\n";

    #[test]
    fn test_downloads_latest_only() {
        let dir = tempfile::tempdir().unwrap();
        let transport = transport(FEED);
        let report = run_mirror(&config(dir.path()), &MirrorOptions::default(), &transport, None)
            .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].status, UpdateStatus::Downloaded);
        assert_eq!(report.records[1].status, UpdateStatus::NotLatest);
        assert_eq!(
            *transport.downloads.borrow(),
            vec![format!("{ROOT}/AdobeBridge5/5.0.1/Bridge.dmg")]
        );
        assert!(dir.path().join("AdobeBridge5-5.0.1.dmg").exists());
    }

    #[test]
    fn test_dry_run_downloads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let transport = transport(FEED);
        let options = MirrorOptions {
            dry_run: true,
            ..Default::default()
        };
        let report = run_mirror(&config(&cache), &options, &transport, None).unwrap();
        assert_eq!(report.count(&UpdateStatus::Planned), 1);
        assert!(transport.downloads.borrow().is_empty());
        assert!(!cache.exists());
    }

    #[test]
    fn test_missing_detail_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let transport = transport(FEED);
        let options = MirrorOptions {
            include_revoked: true,
            ..Default::default()
        };
        let report = run_mirror(&config(dir.path()), &options, &transport, None).unwrap();
        assert_eq!(report.records[0].status, UpdateStatus::Downloaded);
        assert!(matches!(
            report.records[1].status,
            UpdateStatus::DetailUnavailable(_)
        ));
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_feed_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let transport = MapTransport {
            docs: HashMap::new(),
            downloads: RefCell::new(Vec::new()),
        };
        let result = run_mirror(&config(dir.path()), &MirrorOptions::default(), &transport, None);
        assert!(matches!(result, Err(Error::DownloadError(_))));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(UpdateStatus::Redownloaded.to_string(), "re-downloaded");
        assert_eq!(
            UpdateStatus::Failed("boom".to_string()).to_string(),
            "failed: boom"
        );
        assert!(UpdateStatus::Revoked.is_skipped());
        assert!(!UpdateStatus::Cached.is_failure());
    }
}
