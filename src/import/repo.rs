// src/import/repo.rs

//! Read-only view of a Munki repository's pkginfo files

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// SHA-256 of a file as lowercase hex, the form Munki stores in
/// `installer_item_hash`
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", path.display())))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// A Munki repository on disk
#[derive(Debug, Clone)]
pub struct MunkiRepo {
    root: PathBuf,
}

impl MunkiRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pkgsinfo_dir(&self) -> PathBuf {
        self.root.join("pkgsinfo")
    }

    /// Find a pkginfo whose `installer_item_hash` is `installer_hash`
    ///
    /// Unreadable or non-plist files are skipped.
    pub fn find_matching_pkginfo(&self, installer_hash: &str) -> Option<PathBuf> {
        let pkgsinfo = self.pkgsinfo_dir();

        for entry in WalkDir::new(&pkgsinfo)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }

            let value = match plist::Value::from_file(path) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Skipping unreadable pkginfo {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(dict) = value.as_dictionary() else {
                continue;
            };

            if dict.get("installer_item_hash").and_then(|v| v.as_string()) == Some(installer_hash) {
                return Some(path.to_path_buf());
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_pkginfo(dir: &Path, file: &str, name: &str, hash: &str) {
        let mut dict = plist::Dictionary::new();
        dict.insert("name".to_string(), plist::Value::String(name.to_string()));
        dict.insert(
            "installer_item_hash".to_string(),
            plist::Value::String(hash.to_string()),
        );
        plist::Value::Dictionary(dict)
            .to_file_xml(dir.join(file))
            .unwrap();
    }

    #[test]
    fn test_file_sha256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.dmg");
        fs::write(&path, b"hello world").unwrap();
        assert_eq!(
            file_sha256(&path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_find_matching_pkginfo() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("pkgsinfo").join("apps").join("Adobe");
        fs::create_dir_all(&sub).unwrap();
        write_pkginfo(&sub, "AdobeBridge5_5.0.1-5.0.1", "AdobeBridge5_5.0.1", "abc");
        fs::write(sub.join("garbage"), b"not a plist").unwrap();

        let repo = MunkiRepo::new(dir.path());
        assert_eq!(
            repo.find_matching_pkginfo("abc"),
            Some(sub.join("AdobeBridge5_5.0.1-5.0.1"))
        );
        assert!(repo.find_matching_pkginfo("def").is_none());
    }

    #[test]
    fn test_missing_pkgsinfo_dir() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MunkiRepo::new(dir.path().join("nope"));
        assert!(repo.find_matching_pkginfo("y").is_none());
    }
}
