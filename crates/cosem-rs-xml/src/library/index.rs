use crate::error::AdapterError;
use crate::library::resolver::parse_semver;
use cosem_rs::Data;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Firmware version value blob to document path.
pub type VersionMap = BTreeMap<Vec<u8>, PathBuf>;
/// Firmware id value blob to its versions.
pub type TypeMap = BTreeMap<Vec<u8>, VersionMap>;
/// Manufacturer bytes to its types.
pub type ManufacturerMap = BTreeMap<Vec<u8>, TypeMap>;

/// Identity of one stored type document, as raw value blobs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId {
    pub manufacturer: Vec<u8>,
    pub firm_id: Vec<u8>,
    pub firm_ver: Vec<u8>,
}

/// Lazily scanned view of the type library directory.
///
/// The scan result is kept until `invalidate` is called.
#[derive(Debug)]
pub struct ManufacturerIndex {
    types_root: PathBuf,
    cache: Option<ManufacturerMap>,
}

impl ManufacturerIndex {
    pub fn new(types_root: impl Into<PathBuf>) -> Self {
        Self {
            types_root: types_root.into(),
            cache: None,
        }
    }

    pub fn types_root(&self) -> &Path {
        &self.types_root
    }

    pub fn manufacturers(&mut self) -> Result<&ManufacturerMap, AdapterError> {
        if self.cache.is_none() {
            self.cache = Some(scan(&self.types_root)?);
        }
        Ok(self.cache.get_or_insert_with(ManufacturerMap::new))
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn identifiers(&mut self) -> Result<Vec<CollectionId>, AdapterError> {
        let mut identifiers = Vec::new();
        for (manufacturer, types) in self.manufacturers()? {
            for (firm_id, versions) in types {
                for firm_ver in versions.keys() {
                    identifiers.push(CollectionId {
                        manufacturer: manufacturer.clone(),
                        firm_id: firm_id.clone(),
                        firm_ver: firm_ver.clone(),
                    });
                }
            }
        }
        Ok(identifiers)
    }
}

fn scan(types_root: &Path) -> Result<ManufacturerMap, AdapterError> {
    let mut manufacturers = ManufacturerMap::new();
    if !types_root.is_dir() {
        warn!("Type library {} does not exist", types_root.display());
        return Ok(manufacturers);
    }
    info!("Scanning type library {}", types_root.display());

    for entry in fs::read_dir(types_root)? {
        let path = entry?.path();
        let Some(manufacturer) = dir_name(&path).and_then(manufacturer_from_dir) else {
            warn!("Skip {}: not a manufacturer directory", path.display());
            continue;
        };
        let types = manufacturers.entry(manufacturer).or_default();

        for type_entry in fs::read_dir(&path)? {
            let type_path = type_entry?.path();
            let Some(firm_id) = dir_name(&type_path).and_then(|name| hex::decode(name).ok()) else {
                warn!("Skip {}: not a type directory", type_path.display());
                continue;
            };
            let versions = types.entry(firm_id).or_default();

            for version_entry in fs::read_dir(&type_path)? {
                let file = version_entry?.path();
                if !file.is_file() {
                    continue;
                }
                match version_key(&file) {
                    Some((key, true)) => {
                        versions.insert(key, file);
                    }
                    // A 5.0 document for the same version takes precedence.
                    Some((key, false)) => {
                        versions.entry(key).or_insert(file);
                    }
                    None => debug!("Skip {}: not a type document", file.display()),
                }
            }
        }
    }
    Ok(manufacturers)
}

fn dir_name(path: &Path) -> Option<&str> {
    if !path.is_dir() {
        return None;
    }
    path.file_name()?.to_str()
}

/// Six hex digits for 5.0 libraries, three ASCII characters for 3.x ones.
fn manufacturer_from_dir(name: &str) -> Option<Vec<u8>> {
    match name.len() {
        6 => hex::decode(name).ok(),
        3 if name.is_ascii() => Some(name.as_bytes().to_vec()),
        _ => None,
    }
}

/// Version blob of a document file and whether it is a 5.0 document.
///
/// A `.typ` stem is a semantic version; it is keyed by its octet-string
/// encoding so it can be compared with firmware version values.
fn version_key(file: &Path) -> Option<(Vec<u8>, bool)> {
    let stem = file.file_stem()?.to_str()?;
    match file.extension()?.to_str()? {
        "xml" => hex::decode(stem).ok().map(|key| (key, true)),
        "typ" => {
            parse_semver(stem)?;
            Some((Data::OctetString(stem.as_bytes().to_vec()).encode(), false))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manufacturer_dir_names() {
        assert_eq!(manufacturer_from_dir("4b505a"), Some(b"KPZ".to_vec()));
        assert_eq!(manufacturer_from_dir("KPZ"), Some(b"KPZ".to_vec()));
        assert_eq!(manufacturer_from_dir("4b505"), None);
        assert_eq!(manufacturer_from_dir("zzzzzz"), None);
    }

    #[test]
    fn test_version_keys() {
        assert_eq!(
            version_key(Path::new("0905312e372e33.xml")),
            Some((vec![0x09, 0x05, b'1', b'.', b'7', b'.', b'3'], true))
        );
        assert_eq!(
            version_key(Path::new("1.7.3.typ")),
            Some((vec![0x09, 0x05, b'1', b'.', b'7', b'.', b'3'], false))
        );
        assert_eq!(version_key(Path::new("notes.txt")), None);
        assert_eq!(version_key(Path::new("draft.typ")), None);
    }

    #[test]
    fn test_missing_library_is_empty() {
        let mut index = ManufacturerIndex::new("/nonexistent/types");
        assert!(index.manufacturers().unwrap().is_empty());
        assert!(index.identifiers().unwrap().is_empty());
    }
}
