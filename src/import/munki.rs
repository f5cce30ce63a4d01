// src/import/munki.rs

//! munkiimport and makecatalogs invocation

use super::ccp::CcpBundle;
use super::repo::{MunkiRepo, file_sha256};
use super::{ImportOutcome, ImportRequest, PackageImporter};
use crate::config::Config;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// munkiimport preferences, relative to the home directory
pub const MUNKIIMPORT_PREFS: &str = "Library/Preferences/com.googlecode.munki.munkiimport.plist";

/// Location of the current user's munkiimport preferences
pub fn default_prefs_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(MUNKIIMPORT_PREFS))
}

/// Imports payloads with the Munki command-line tools
#[derive(Debug, Clone)]
pub struct MunkiImporter {
    munki_dir: PathBuf,
    options: Vec<String>,
    default_subdirectory: String,
    repo: Option<MunkiRepo>,
    force: bool,
}

impl MunkiImporter {
    /// Check that Munki is installed and configured, using the user's prefs
    pub fn from_config(config: &Config, force: bool) -> Result<Self> {
        let prefs = default_prefs_path().ok_or_else(|| {
            Error::ConfigError("Cannot determine home directory for munkiimport prefs".to_string())
        })?;
        Self::with_prefs(config, &prefs, force)
    }

    /// Check that Munki is installed and configured, reading `prefs_path`
    pub fn with_prefs(config: &Config, prefs_path: &Path, force: bool) -> Result<Self> {
        let munkiimport = config.munki_dir.join("munkiimport");
        if !munkiimport.exists() {
            return Err(Error::NotFoundError(format!(
                "munkiimport not found at {}",
                munkiimport.display()
            )));
        }
        if !prefs_path.exists() {
            return Err(Error::ConfigError(
                "Your Munki repo seems to not be configured. Run munkiimport --configure first."
                    .to_string(),
            ));
        }

        let repo = read_repo_path(prefs_path)?.map(MunkiRepo::new);
        match &repo {
            Some(r) => debug!("Munki repo at {}", r.root().display()),
            None => warn!("No repo_path in {}, duplicate checks disabled", prefs_path.display()),
        }

        Ok(Self {
            munki_dir: config.munki_dir.clone(),
            options: config.munkiimport_options.clone(),
            default_subdirectory: config.munki_pkg_subdir.clone(),
            repo,
            force,
        })
    }

    /// Arguments for one munkiimport call
    pub fn build_command_args(&self, request: &ImportRequest) -> Vec<String> {
        let mut args = vec!["--nointeractive".to_string()];
        args.extend(self.options.iter().cloned());
        if !self.options.iter().any(|o| o == "--subdirectory") {
            args.push("--subdirectory".to_string());
            args.push(self.default_subdirectory.clone());
        }
        for base in &request.update_for {
            args.push("--update_for".to_string());
            args.push(base.clone());
        }
        args.extend([
            "--name".to_string(),
            request.item_name.clone(),
            "--displayname".to_string(),
            request.display_name.clone(),
            "--description".to_string(),
            request.description.clone(),
        ]);
        args.push(request.payload_path.to_string_lossy().into_owned());
        args
    }

    /// Arguments for importing a CCP installer with its uninstaller
    pub fn build_ccp_args(options: &[String], bundle: &CcpBundle) -> Vec<String> {
        let mut args = vec!["--nointeractive".to_string()];
        args.extend(options.iter().cloned());
        args.push("--uninstallerpkg".to_string());
        args.push(bundle.uninstaller.to_string_lossy().into_owned());
        args.push(bundle.installer.to_string_lossy().into_owned());
        args
    }

    /// Import a CCP bundle; there is no duplicate check for these
    pub fn import_ccp_bundle(&self, options: &[String], bundle: &CcpBundle) -> Result<()> {
        info!("Importing CCP bundle {}", bundle.name);
        self.run_tool("munkiimport", &Self::build_ccp_args(options, bundle))
    }

    /// Rebuild the repository catalogs
    pub fn make_catalogs(&self) -> Result<()> {
        let args: Vec<String> = self
            .repo
            .iter()
            .map(|r| r.root().to_string_lossy().into_owned())
            .collect();
        self.run_tool("makecatalogs", &args)
    }

    fn already_imported(&self, request: &ImportRequest) -> Result<bool> {
        if self.force {
            return Ok(false);
        }
        let Some(repo) = &self.repo else {
            return Ok(false);
        };

        info!("Looking for a matching pkginfo for {}", request.item_name);
        let hash = file_sha256(&request.payload_path)?;
        match repo.find_matching_pkginfo(&hash) {
            Some(path) => {
                info!("Exact match already in the repo: {}", path.display());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn run_tool(&self, tool: &str, args: &[String]) -> Result<()> {
        let program = self.munki_dir.join(tool);
        debug!("Running {} {:?}", program.display(), args);

        let status = Command::new(&program).args(args).status().map_err(|e| {
            Error::ImportError(format!("Failed to run {}: {e}", program.display()))
        })?;

        if !status.success() {
            return Err(Error::ImportError(format!("{tool} returned an error: {status}")));
        }
        Ok(())
    }
}

impl PackageImporter for MunkiImporter {
    fn import(&self, request: &ImportRequest) -> Result<ImportOutcome> {
        if self.already_imported(request)? {
            return Ok(ImportOutcome::AlreadyPresent);
        }

        info!(
            "Calling munkiimport on {}, file {}",
            request.item_name,
            request.payload_path.display()
        );
        self.run_tool("munkiimport", &self.build_command_args(request))?;

        // Catalogs are rebuilt after each import so the next channel sees it
        if let Err(e) = self.make_catalogs() {
            warn!("Imported {} but makecatalogs failed: {}", request.item_name, e);
        }
        Ok(ImportOutcome::Imported)
    }
}

fn read_repo_path(prefs_path: &Path) -> Result<Option<PathBuf>> {
    let prefs = plist::Value::from_file(prefs_path).map_err(|e| {
        Error::ConfigError(format!("Cannot read {}: {e}", prefs_path.display()))
    })?;
    Ok(prefs
        .as_dictionary()
        .and_then(|d| d.get("repo_path"))
        .and_then(|v| v.as_string())
        .map(PathBuf::from))
}
