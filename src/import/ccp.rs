// src/import/ccp.rs

//! Creative Cloud Packager output discovery
//!
//! A CCP build directory holds one folder per package:
//!
//! ```text
//! MyCCPackages/
//! └── AdobeAfterEffectsCC2014/
//!     ├── AdobeAfterEffectsCC2014.ccp
//!     └── Build/
//!         ├── AdobeAfterEffectsCC2014_Install.pkg
//!         └── AdobeAfterEffectsCC2014_Uninstall.pkg
//! ```

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An installer/uninstaller pair built by CCP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CcpBundle {
    pub name: String,
    pub installer: PathBuf,
    pub uninstaller: PathBuf,
}

fn first_match(dir: &Path, pattern: &str) -> Option<PathBuf> {
    let full = dir.join(pattern);
    let mut matches: Vec<PathBuf> = glob::glob(&full.to_string_lossy())
        .ok()?
        .filter_map(|p| p.ok())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

/// Find every CCP bundle directly under `dir`, sorted by name
///
/// Folders without both an install and an uninstall package are skipped.
pub fn find_ccp_bundles(dir: &Path) -> Result<Vec<CcpBundle>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::NotFoundError(format!("Cannot read package directory {}: {e}", dir.display()))
    })?;

    let mut bundles = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let build = path.join("Build");

        match (
            first_match(&build, "*Install.pkg"),
            first_match(&build, "*Uninstall.pkg"),
        ) {
            (Some(installer), Some(uninstaller)) => {
                debug!("Found CCP bundle {}", name);
                bundles.push(CcpBundle {
                    name,
                    installer,
                    uninstaller,
                });
            }
            _ => warn!("Skipping {}: no Build/*Install.pkg and *Uninstall.pkg pair", name),
        }
    }

    bundles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(bundles)
}
