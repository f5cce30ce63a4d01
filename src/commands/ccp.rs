// src/commands/ccp.rs
//! Creative Cloud Packager import command

use aamporter::import::find_ccp_bundles;
use aamporter::{Config, MunkiImporter};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

/// Import every CCP build under `dir`
pub fn cmd_import_ccp(config_path: &Path, dir: &Path) -> Result<()> {
    // Only the munkiimport settings are used; products may be absent
    let config = if config_path.exists() {
        Config::read(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        info!("No config at {}, using defaults", config_path.display());
        Config::default()
    };

    let importer = MunkiImporter::from_config(&config, false)?;
    let dir = std::fs::canonicalize(dir)?;
    let bundles = find_ccp_bundles(&dir)?;
    if bundles.is_empty() {
        println!("No CCP packages found in {}", dir.display());
        return Ok(());
    }

    let mut failed = 0;
    for bundle in &bundles {
        match importer.import_ccp_bundle(&config.ccp_import_options, bundle) {
            Ok(()) => println!("Imported {}", bundle.name),
            Err(e) => {
                warn!("Failed to import {}: {}", bundle.name, e);
                failed += 1;
            }
        }
    }

    println!("Imported {} of {} packages", bundles.len() - failed, bundles.len());
    if failed > 0 {
        anyhow::bail!("{} package(s) failed to import", failed);
    }
    Ok(())
}
