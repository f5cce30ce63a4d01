// src/config.rs

//! Configuration file for aamporter
//!
//! The configuration is read once at startup and passed by reference to
//! whatever needs it. TOML is the native format; a legacy `aamporter.plist`
//! with the same keys is accepted too, chosen by file extension.
//!
//! # Example aamporter.toml
//!
//! ```toml
//! local_cache_path = "aamcache"
//! pkginfo_name_suffix = "_CS6"
//! munkiimport_options = ["--catalog", "testing", "--developer", "Adobe"]
//!
//! [[products]]
//! name = "AdobePhotoshopCS6"
//! channels = ["AdobePhotoshop13-mul", "PhotoshopCameraRaw7-7.0"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::detail::UPDATE_PATH_PREFIX;
use crate::feed::{FEED_PATH, ParseOptions};

/// Default configuration file name
pub const DEFAULT_CONFIG_PATH: &str = "aamporter.toml";

/// Default feed host
pub const DEFAULT_WEBFEED_BASEURL: &str = "http://swupmf.adobe.com";

/// Default update payload host
pub const DEFAULT_UPDATES_BASEURL: &str = "http://swupdl.adobe.com";

/// Errors from loading or validating the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse plist config file: {0}")]
    PlistError(#[from] plist::Error),

    #[error("Invalid server URL '{url}': {source}")]
    InvalidUrl { url: String, source: url::ParseError },

    #[error("No products configured")]
    NoProducts,

    #[error("A product entry has an empty name")]
    EmptyProductName,

    #[error("Product '{0}' has no channels")]
    NoChannels(String),
}

/// One managed product and the feed channels that apply to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<String>,
}

/// Resolved feed and update URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Full URL of the updater feed document
    pub feed_url: String,
    /// Directory URL under which `<product>/<version>/` live
    pub updates_root: String,
}

/// aamporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Overrides both the feed and update hosts (an internal mirror)
    #[serde(default)]
    pub aam_server_baseurl: Option<String>,

    #[serde(default = "default_cache_path")]
    pub local_cache_path: PathBuf,

    #[serde(default)]
    pub products: Vec<ProductSpec>,

    /// Extra options passed to every munkiimport call
    #[serde(default)]
    pub munkiimport_options: Vec<String>,

    /// Appended to the pkginfo item name
    #[serde(default)]
    pub pkginfo_name_suffix: String,

    #[serde(default = "default_munki_dir")]
    pub munki_dir: PathBuf,

    /// Repo subdirectory used when munkiimport_options has no --subdirectory
    #[serde(default = "default_munki_pkg_subdir")]
    pub munki_pkg_subdir: String,

    /// munkiimport options for CCP bundle imports
    #[serde(default = "default_ccp_import_options")]
    pub ccp_import_options: Vec<String>,

    #[serde(default)]
    pub discard_feature_entries: bool,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("aamcache")
}

fn default_munki_dir() -> PathBuf {
    PathBuf::from("/usr/local/munki")
}

fn default_munki_pkg_subdir() -> String {
    "apps/Adobe/CS_Updates".to_string()
}

fn default_ccp_import_options() -> Vec<String> {
    [
        "--subdirectory",
        "apps/Adobe/CC/2014",
        "--developer",
        "Adobe",
        "--category",
        "Creativity",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aam_server_baseurl: None,
            local_cache_path: default_cache_path(),
            products: Vec::new(),
            munkiimport_options: Vec::new(),
            pkginfo_name_suffix: String::new(),
            munki_dir: default_munki_dir(),
            munki_pkg_subdir: default_munki_pkg_subdir(),
            ccp_import_options: default_ccp_import_options(),
            discard_feature_entries: false,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    ///
    /// A relative `local_cache_path` is taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file without validating it
    ///
    /// For commands that use the munkiimport settings but no product list.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match path.extension().and_then(|e| e.to_str()) {
            Some("plist") => plist::from_file(path)?,
            _ => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
                        path: path.to_path_buf(),
                        source,
                    })?;
                toml::from_str::<Config>(&content)?
            }
        };

        if config.local_cache_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.local_cache_path = dir.join(&config.local_cache_path);
            }
        }

        Ok(config)
    }

    /// Parse and validate a TOML configuration string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.products.is_empty() {
            return Err(ConfigError::NoProducts);
        }
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::EmptyProductName);
            }
            if product.channels.is_empty() {
                return Err(ConfigError::NoChannels(product.name.clone()));
            }
        }
        self.endpoints()?;
        Ok(())
    }

    /// Feed and update URLs, honoring `aam_server_baseurl`
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let (feed_base, updates_base) = match &self.aam_server_baseurl {
            Some(base) => (base.as_str(), base.as_str()),
            None => (DEFAULT_WEBFEED_BASEURL, DEFAULT_UPDATES_BASEURL),
        };

        let join = |base: &str, path: &str| -> Result<String, ConfigError> {
            let invalid = |source| ConfigError::InvalidUrl {
                url: base.to_string(),
                source,
            };
            let url = Url::parse(base).map_err(invalid)?.join(path).map_err(invalid)?;
            Ok(url.to_string())
        };

        Ok(Endpoints {
            feed_url: join(feed_base, FEED_PATH)?,
            updates_root: join(updates_base, UPDATE_PATH_PREFIX)?,
        })
    }

    /// Feed parsing options derived from the configuration
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            discard_feature_entries: self.discard_feature_entries,
        }
    }

    /// Names of every product whose channel list contains `channel`
    pub fn base_products_for_channel(&self, channel: &str) -> Vec<&str> {
        self.products
            .iter()
            .filter(|p| p.channels.iter().any(|c| c == channel))
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Every configured channel, first occurrence order
    pub fn all_channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = Vec::new();
        for product in &self.products {
            for channel in &product.channels {
                if !channels.contains(&channel.as_str()) {
                    channels.push(channel);
                }
            }
        }
        channels
    }
}
