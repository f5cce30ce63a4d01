// src/cache.rs

//! Local payload cache
//!
//! Payloads are stored flat in the cache directory as
//! `<product>-<version>.<ext>`. A file whose size matches the size declared
//! by the detail document is complete; anything else is an interrupted
//! download and is fetched again in full.

use crate::client::Transport;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker file used to probe that the cache directory is writable
const WRITE_PROBE: &str = ".aamporter-write-probe";

/// What [`ensure_payload`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Already present with the declared size
    Cached,
    /// Not present, downloaded
    Downloaded,
    /// Present with the wrong size, downloaded again
    Redownloaded,
}

/// Destination path of a payload in the cache
pub fn payload_path(cache_dir: &Path, product: &str, version: &str, extension: &str) -> PathBuf {
    cache_dir.join(format!("{}-{}.{}", product, version, extension))
}

/// Make sure `path` is a writable directory, creating it if needed
pub fn prepare_cache_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(Error::ConfigError(format!(
            "Local cache path {} exists, but it is not a directory",
            path.display()
        )));
    }

    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            Error::ConfigError(format!(
                "Local cache path {} could not be created: {e}",
                path.display()
            ))
        })?;
        info!("Created local cache at {}", path.display());
    }

    let probe = path.join(WRITE_PROBE);
    fs::write(&probe, b"").map_err(|e| {
        Error::ConfigError(format!(
            "Cannot write to local cache path {}: {e}",
            path.display()
        ))
    })?;
    let _ = fs::remove_file(&probe);

    Ok(())
}

/// Download `url` to `dest` unless a complete copy is already there
pub fn ensure_payload(
    transport: &dyn Transport,
    url: &str,
    dest: &Path,
    expected_size: u64,
) -> Result<CacheOutcome> {
    let outcome = match fs::metadata(dest) {
        Ok(meta) if meta.len() == expected_size => {
            info!("Skipping download of {}, we already have it", dest.display());
            return Ok(CacheOutcome::Cached);
        }
        Ok(meta) => {
            info!(
                "Incomplete download of {} ({} of {} bytes), re-starting",
                dest.display(),
                meta.len(),
                expected_size
            );
            CacheOutcome::Redownloaded
        }
        Err(_) => CacheOutcome::Downloaded,
    };

    let written = transport.download_file(url, dest)?;
    if written != expected_size {
        debug!(
            "Downloaded {} bytes for {}, detail document declared {}",
            written,
            dest.display(),
            expected_size
        );
    }
    Ok(outcome)
}
