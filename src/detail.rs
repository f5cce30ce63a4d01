// src/detail.rs

//! Per-update detail documents
//!
//! Every product version in the feed has a small XML document next to its
//! payload, at `<updates root>/<product>/<version>/<version>.xml`. It names the
//! payload file and its size, and carries the localized strings used when the
//! payload is imported.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Update directory root relative to the updates base URL
pub const UPDATE_PATH_PREFIX: &str = "updates/oobe/aam20/mac";

/// Licensing type value marking updates restricted to the subscription program
pub const EXCLUDED_LICENSING_TYPE: &str = "1";

const FILE_ELEMENT: &str = "InstallFiles/File";
const FILE_NAME: &str = "InstallFiles/File/Name";
const FILE_SIZE: &str = "InstallFiles/File/Size";
const DESCRIPTION: &str = "Description/en_US";
const DISPLAY_NAME: &str = "DisplayName/en_US";
const LICENSING_TYPE: &str = "LicensingType";

/// Errors from reading a detail document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailError {
    #[error("Malformed detail document: {0}")]
    Malformed(String),

    #[error("No InstallFiles/File element in detail document")]
    NoInstallFile,

    #[error("Detail document is missing {0}")]
    MissingField(&'static str),

    #[error("Invalid install file size '{0}'")]
    InvalidSize(String),
}

/// Fields of a detail document used for download and import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDetail {
    /// Payload file name, relative to the update directory
    pub file_name: String,
    /// Declared payload size in bytes
    pub file_size: u64,
    pub description: String,
    pub display_name: String,
    pub licensing_type: Option<String>,
}

impl UpdateDetail {
    /// Parse a detail document
    pub fn parse(xml: &str) -> Result<Self, DetailError> {
        let doc = scan_document(xml)?;

        if !doc.has_install_file {
            return Err(DetailError::NoInstallFile);
        }

        let mut fields = doc.fields;
        let mut take = |key: &'static str| fields.remove(key).ok_or(DetailError::MissingField(key));

        let file_name = take(FILE_NAME)?;
        let size_text = take(FILE_SIZE)?;
        let description = take(DESCRIPTION)?;
        let display_name = take(DISPLAY_NAME)?;
        let licensing_type = fields.remove(LICENSING_TYPE);

        let file_size = size_text
            .trim()
            .parse::<u64>()
            .map_err(|_| DetailError::InvalidSize(size_text.clone()))?;

        Ok(Self {
            file_name,
            file_size,
            description,
            display_name,
            licensing_type,
        })
    }

    /// Whether the update belongs to the excluded licensing class
    pub fn is_licensing_excluded(&self) -> bool {
        self.licensing_type.as_deref().map(str::trim) == Some(EXCLUDED_LICENSING_TYPE)
    }

    /// Payload file extension, `dmg` when the name has none
    ///
    /// Only an alphanumeric extension of the final path component is used,
    /// so the result never carries a separator into a cache file name.
    pub fn payload_extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.bytes().all(|b| b.is_ascii_alphanumeric()))
            .unwrap_or("dmg")
    }
}

/// Text of interesting paths, first occurrence only
struct ScannedDocument {
    fields: HashMap<&'static str, String>,
    has_install_file: bool,
}

fn wanted(path: &str) -> Option<&'static str> {
    [FILE_NAME, FILE_SIZE, DESCRIPTION, DISPLAY_NAME, LICENSING_TYPE]
        .into_iter()
        .find(|key| *key == path)
}

fn relative_path(stack: &[String]) -> String {
    stack.iter().skip(1).map(String::as_str).collect::<Vec<_>>().join("/")
}

fn scan_document(xml: &str) -> Result<ScannedDocument, DetailError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut doc = ScannedDocument {
        fields: HashMap::new(),
        has_install_file: false,
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                saw_root = true;
                if relative_path(&stack) == FILE_ELEMENT {
                    doc.has_install_file = true;
                }
            }
            Ok(Event::Empty(e)) => {
                stack.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                saw_root = true;
                if relative_path(&stack) == FILE_ELEMENT {
                    doc.has_install_file = true;
                }
                stack.pop();
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| DetailError::Malformed(e.to_string()))?
                    .into_owned();
                record(&mut doc, &stack, text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                record(&mut doc, &stack, text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DetailError::Malformed(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(DetailError::Malformed("no root element".to_string()));
    }
    if !stack.is_empty() {
        return Err(DetailError::Malformed(format!(
            "unclosed element <{}>",
            stack.join("/")
        )));
    }

    Ok(doc)
}

fn record(doc: &mut ScannedDocument, stack: &[String], text: String) {
    if let Some(key) = wanted(&relative_path(stack)) {
        doc.fields.entry(key).or_insert(text);
    }
}

/// URL of the directory holding one update's files
pub fn update_dir_url(updates_root: &str, product: &str, version: &str) -> String {
    format!("{}/{}/{}", updates_root.trim_end_matches('/'), product, version)
}

/// URL of one update's detail document
pub fn detail_url(updates_root: &str, product: &str, version: &str) -> String {
    format!("{}/{}.xml", update_dir_url(updates_root, product, version), version)
}

/// URL of one update's payload
pub fn payload_url(updates_root: &str, product: &str, version: &str, file_name: &str) -> String {
    format!("{}/{}", update_dir_url(updates_root, product, version), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<PatchInfo>
  <DisplayName>
    <en_US>Photoshop CS6 13.0.1 update</en_US>
    <fr_FR>Mise a jour</fr_FR>
  </DisplayName>
  <Description>
    <en_US>Fixes &amp; improvements</en_US>
  </Description>
  <InstallFiles>
    <File>
      <Name>AdobePhotoshop13.0.1-mul-AdobeUpdate.dmg</Name>
      <Size>152633454</Size>
    </File>
  </InstallFiles>
</PatchInfo>
"#;

    #[test]
    fn test_parse_sample() {
        let detail = UpdateDetail::parse(SAMPLE).unwrap();
        assert_eq!(detail.file_name, "AdobePhotoshop13.0.1-mul-AdobeUpdate.dmg");
        assert_eq!(detail.file_size, 152633454);
        assert_eq!(detail.display_name, "Photoshop CS6 13.0.1 update");
        assert_eq!(detail.description, "Fixes & improvements");
        assert_eq!(detail.licensing_type, None);
        assert!(!detail.is_licensing_excluded());
        assert_eq!(detail.payload_extension(), "dmg");
    }

    #[test]
    fn test_licensing_type() {
        let xml = SAMPLE.replace("<InstallFiles>", "<LicensingType>1</LicensingType><InstallFiles>");
        let detail = UpdateDetail::parse(&xml).unwrap();
        assert_eq!(detail.licensing_type.as_deref(), Some("1"));
        assert!(detail.is_licensing_excluded());

        let xml = SAMPLE.replace("<InstallFiles>", "<LicensingType>0</LicensingType><InstallFiles>");
        assert!(!UpdateDetail::parse(&xml).unwrap().is_licensing_excluded());
    }

    #[test]
    fn test_missing_install_file() {
        let xml = "<PatchInfo><DisplayName><en_US>x</en_US></DisplayName></PatchInfo>";
        assert_eq!(UpdateDetail::parse(xml), Err(DetailError::NoInstallFile));

        let xml = "<PatchInfo><InstallFiles><File/></InstallFiles></PatchInfo>";
        assert_eq!(
            UpdateDetail::parse(xml),
            Err(DetailError::MissingField(FILE_NAME))
        );
    }

    #[test]
    fn test_missing_description() {
        let xml = SAMPLE.replace("<en_US>Fixes &amp; improvements</en_US>", "");
        assert_eq!(
            UpdateDetail::parse(&xml),
            Err(DetailError::MissingField(DESCRIPTION))
        );
    }

    #[test]
    fn test_invalid_size() {
        let xml = SAMPLE.replace("152633454", "lots");
        assert_eq!(
            UpdateDetail::parse(&xml),
            Err(DetailError::InvalidSize("lots".to_string()))
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            UpdateDetail::parse("<PatchInfo><InstallFiles></PatchInfo>"),
            Err(DetailError::Malformed(_))
        ));
        assert!(matches!(
            UpdateDetail::parse("not xml at all"),
            Err(DetailError::Malformed(_))
        ));
        assert!(matches!(
            UpdateDetail::parse("<PatchInfo><InstallFiles>"),
            Err(DetailError::Malformed(_))
        ));
    }

    #[test]
    fn test_first_file_wins() {
        let xml = SAMPLE.replace(
            "</InstallFiles>",
            "<File><Name>second.dmg</Name><Size>1</Size></File></InstallFiles>",
        );
        let detail = UpdateDetail::parse(&xml).unwrap();
        assert_eq!(detail.file_name, "AdobePhotoshop13.0.1-mul-AdobeUpdate.dmg");
    }

    #[test]
    fn test_payload_extension() {
        let mut detail = UpdateDetail::parse(SAMPLE).unwrap();
        detail.file_name = "Update.zip".to_string();
        assert_eq!(detail.payload_extension(), "zip");
        detail.file_name = "Update".to_string();
        assert_eq!(detail.payload_extension(), "dmg");
        detail.file_name = "a/b/Update.zip".to_string();
        assert_eq!(detail.payload_extension(), "zip");
    }

    #[test]
    fn test_payload_extension_ignores_directory_parts() {
        let mut detail = UpdateDetail::parse(SAMPLE).unwrap();
        for name in ["x.b/../../x", "v1.2/../../../escape", "Update.d/mg", "Update.", "Up.da te"] {
            detail.file_name = name.to_string();
            assert_eq!(detail.payload_extension(), "dmg", "{name}");
        }
    }

    #[test]
    fn test_urls() {
        let root = "http://swupdl.adobe.com/updates/oobe/aam20/mac";
        assert_eq!(
            detail_url(root, "AdobePhotoshop13.0.1", "13.0.1"),
            "http://swupdl.adobe.com/updates/oobe/aam20/mac/AdobePhotoshop13.0.1/13.0.1/13.0.1.xml"
        );
        assert_eq!(
            payload_url(&format!("{root}/"), "P", "1.0", "P.dmg"),
            "http://swupdl.adobe.com/updates/oobe/aam20/mac/P/1.0/P.dmg"
        );
    }
}
