// src/import/mod.rs

//! Importing downloaded payloads into a Munki repository
//!
//! The mirror run only talks to [`PackageImporter`]. [`MunkiImporter`] is the
//! implementation that shells out to the Munki command-line tools.

mod ccp;
mod munki;
mod repo;

pub use ccp::{CcpBundle, find_ccp_bundles};
pub use munki::{MUNKIIMPORT_PREFS, MunkiImporter, default_prefs_path};
pub use repo::{MunkiRepo, file_sha256};

use crate::error::Result;
use std::path::PathBuf;

/// One payload to import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub payload_path: PathBuf,
    /// pkginfo item name, see [`item_name`]
    pub item_name: String,
    pub display_name: String,
    pub description: String,
    /// Base products this update applies to
    pub update_for: Vec<String>,
}

/// Result of a successful import call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    /// The repository already has this item with an identical payload
    AlreadyPresent,
}

/// Something that can place a payload into a software repository
pub trait PackageImporter {
    fn import(&self, request: &ImportRequest) -> Result<ImportOutcome>;
}

/// pkginfo item name for an update product
///
/// Munki item names may not contain '-', so it is replaced by '_'.
pub fn item_name(product: &str, suffix: &str) -> String {
    format!("{}{}", product.replace('-', "_"), suffix)
}
