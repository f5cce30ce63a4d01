// src/commands/mod.rs
//! Command handlers for the aamporter CLI

mod ccp;
mod feed;
mod mirror;

pub use ccp::cmd_import_ccp;
pub use feed::cmd_feed;
pub use mirror::cmd_mirror;

use aamporter::{Config, FeedClient};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

/// Load and validate the configuration file
fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// HTTP client using the configured timeout
fn build_client(config: &Config, show_progress: bool) -> Result<FeedClient> {
    let client = FeedClient::with_timeout(Duration::from_secs(config.http_timeout_secs))?;
    Ok(client.with_progress(show_progress))
}
