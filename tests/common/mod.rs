// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use aamporter::config::ProductSpec;
use aamporter::import::{ImportOutcome, ImportRequest, PackageImporter};
use aamporter::{Config, Error, Result, Transport};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

pub const FEED_URL: &str = "http://swupmf.adobe.com/webfeed/oobe/aam20/mac/updaterfeed.xml";
pub const UPDATES_ROOT: &str = "http://swupdl.adobe.com/updates/oobe/aam20/mac";

/// A small feed covering superseded, revoked and licensing-restricted updates
pub const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<updaterfeed>
<COMBO,AdobePhotoshopCS6,AdobeBridgeCS6,AdobePhotoshop13-mul,AdobeCombo,1.0>
<AdobePhotoshopCS6-13.0,AdobePhotoshop13-mul,AdobePhotoshop13-mul,13.0.1>
<AdobePhotoshopCS6-13.0,AdobePhotoshop13-mul,AdobePhotoshop13-mul,13.0.4>
<REVOKE,PhotoshopCameraRaw7-7.0,PhotoshopCameraRaw764bit-7.0,7.1.71>
<REVOKE,PhotoshopCameraRaw7-7.0,PhotoshopCameraRaw764bit-7.0,7.2.82>
<PhotoshopCameraRaw7,PhotoshopCameraRaw7-7.0,PhotoshopCameraRaw764bit-7.0,7.2.82>
<PhotoshopCameraRaw7,PhotoshopCameraRaw7-7.0,PhotoshopCameraRaw764bit-7.0,7.1.71>
<AdobeBridgeCS6-5.0,AdobeBridge5-mul,AdobeBridge5-mul,5.0.1>
<AdobeBridgeCS6-5.0,AdobeBridge5-mul,AdobeBridgeCC-mul,6.0>
</updaterfeed>
"#;

/// Detail document for a payload of `size` bytes
pub fn detail_xml(display_name: &str, file_name: &str, size: usize, licensing: Option<&str>) -> String {
    let licensing = licensing
        .map(|l| format!("<LicensingType>{l}</LicensingType>"))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<PatchInfo>
  <DisplayName><en_US>{display_name}</en_US></DisplayName>
  <Description><en_US>{display_name} update</en_US></Description>
  {licensing}
  <InstallFiles>
    <File>
      <Name>{file_name}</Name>
      <Size>{size}</Size>
    </File>
  </InstallFiles>
</PatchInfo>
"#
    )
}

/// In-memory transport that records every request
#[derive(Default)]
pub struct RecordingTransport {
    docs: HashMap<String, String>,
    payloads: HashMap<String, Vec<u8>>,
    pub fetched: RefCell<Vec<String>>,
    pub downloaded: RefCell<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.docs.insert(url.into(), body.into());
        self
    }

    /// Register a detail document and its payload under the updates root
    pub fn with_update(
        mut self,
        product: &str,
        version: &str,
        payload: &[u8],
        licensing: Option<&str>,
    ) -> Self {
        let file_name = format!("{product}-{version}-AdobeUpdate.dmg");
        let dir = format!("{UPDATES_ROOT}/{product}/{version}");
        self.docs.insert(
            format!("{dir}/{version}.xml"),
            detail_xml(product, &file_name, payload.len(), licensing),
        );
        self.payloads.insert(format!("{dir}/{file_name}"), payload.to_vec());
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloaded.borrow().len()
    }
}

impl Transport for RecordingTransport {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetched.borrow_mut().push(url.to_string());
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| Error::DownloadError(format!("HTTP 404 Not Found from {url}")))
    }

    fn download_file(&self, url: &str, dest_path: &Path) -> Result<u64> {
        self.downloaded.borrow_mut().push(url.to_string());
        let body = self
            .payloads
            .get(url)
            .ok_or_else(|| Error::DownloadError(format!("HTTP 404 Not Found from {url}")))?;
        fs::write(dest_path, body)?;
        Ok(body.len() as u64)
    }
}

/// Importer that records requests instead of running munkiimport
#[derive(Default)]
pub struct RecordingImporter {
    pub requests: RefCell<Vec<ImportRequest>>,
    /// Item names reported as already in the repo
    pub existing: HashSet<String>,
    /// Item names whose import fails
    pub failing: HashSet<String>,
}

impl PackageImporter for RecordingImporter {
    fn import(&self, request: &ImportRequest) -> Result<ImportOutcome> {
        self.requests.borrow_mut().push(request.clone());
        if self.failing.contains(&request.item_name) {
            return Err(Error::ImportError("munkiimport returned an error".to_string()));
        }
        if self.existing.contains(&request.item_name) {
            return Ok(ImportOutcome::AlreadyPresent);
        }
        Ok(ImportOutcome::Imported)
    }
}

/// Transport serving [`SAMPLE_FEED`] and every update it references
pub fn sample_transport() -> RecordingTransport {
    RecordingTransport::new()
        .with_doc(FEED_URL, SAMPLE_FEED)
        .with_update("AdobePhotoshop13-mul", "13.0.4", b"photoshop 13.0.4", None)
        .with_update("AdobePhotoshop13-mul", "13.0.1", b"photoshop 13.0.1", None)
        .with_update("PhotoshopCameraRaw764bit-7.0", "7.2.82", b"camera raw 7.2.82", None)
        .with_update("AdobeBridge5-mul", "5.0.1", b"bridge 5.0.1", None)
        .with_update("AdobeBridgeCC-mul", "6.0", b"bridge cc 6.0", Some("1"))
}

/// Configuration for [`SAMPLE_FEED`] with the cache at `cache`
pub fn sample_config(cache: &Path) -> Config {
    Config {
        local_cache_path: cache.to_path_buf(),
        pkginfo_name_suffix: "_CS6".to_string(),
        products: vec![
            ProductSpec {
                name: "AdobePhotoshopCS6".to_string(),
                channels: vec![
                    "AdobePhotoshop13-mul".to_string(),
                    "PhotoshopCameraRaw7-7.0".to_string(),
                ],
            },
            ProductSpec {
                name: "AdobeBridgeCS6".to_string(),
                channels: vec![
                    "AdobeBridge5-mul".to_string(),
                    "PhotoshopCameraRaw7-7.0".to_string(),
                ],
            },
        ],
        ..Config::default()
    }
}
