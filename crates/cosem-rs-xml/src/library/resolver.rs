use super::index::{CollectionId, ManufacturerIndex, VersionMap};
use crate::error::AdapterError;
use cosem_rs::ParameterValue;
use log::{info, warn};
use semver::Version;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

type ResolveKey = (Vec<u8>, ParameterValue, ParameterValue);

/// Maps a requested identity to the type document that describes it.
///
/// An exact version match wins. Otherwise the newest stored version of the
/// same major that is not newer than the requested one is used, provided
/// the library holds some version of that major at least as new as the
/// request. Results are cached until `invalidate`.
#[derive(Debug)]
pub struct VersionResolver {
    index: ManufacturerIndex,
    resolved: HashMap<ResolveKey, PathBuf>,
}

impl VersionResolver {
    pub fn new(types_root: impl Into<PathBuf>) -> Self {
        Self {
            index: ManufacturerIndex::new(types_root),
            resolved: HashMap::new(),
        }
    }

    pub fn types_root(&self) -> &Path {
        self.index.types_root()
    }

    /// Finds the type document for an identity.
    ///
    /// # Arguments
    /// * `manufacturer` - The manufacturer id as raw bytes.
    /// * `firm_id` - The firmware id; only its value is compared.
    /// * `firm_ver` - The requested firmware version.
    ///
    /// # Returns
    /// The path of the exact or nearest compatible type document.
    ///
    /// # Errors
    /// `UnsupportedManufacturer` and `UnsupportedType` when nothing is stored
    /// for them; `UnsupportedVersion` when no stored version is compatible or
    /// `firm_ver` is not a version string. Scan errors are passed through.
    pub fn resolve(
        &mut self,
        manufacturer: &[u8],
        firm_id: &ParameterValue,
        firm_ver: &ParameterValue,
    ) -> Result<PathBuf, AdapterError> {
        let key = (manufacturer.to_vec(), firm_id.clone(), firm_ver.clone());
        if let Some(path) = self.resolved.get(&key) {
            return Ok(path.clone());
        }

        let types = self
            .index
            .manufacturers()?
            .get(manufacturer)
            .ok_or_else(|| AdapterError::UnsupportedManufacturer(manufacturer.to_vec()))?;
        let versions = types.get(&firm_id.value).ok_or_else(|| AdapterError::UnsupportedType {
            manufacturer: manufacturer.to_vec(),
            firm_id: firm_id.value.clone(),
        })?;
        let unsupported = || AdapterError::UnsupportedVersion {
            firm_id: firm_id.value.clone(),
            version: firm_ver.to_string(),
        };

        let path = match versions.get(&firm_ver.value) {
            Some(path) => path.clone(),
            None => {
                let requested = version_of(&firm_ver.value).ok_or_else(unsupported)?;
                warn!("No type for {requested}, looking for a compatible version");
                let path = nearest(&requested, versions).ok_or_else(unsupported)?;
                info!("Using {} for {requested}", path.display());
                path.clone()
            }
        };
        self.resolved.insert(key, path.clone());
        Ok(path)
    }

    /// Forgets the directory scan and every resolved identity.
    pub fn invalidate(&mut self) {
        self.index.invalidate();
        self.resolved.clear();
    }

    /// Every stored identity, scanning the library on first use.
    pub fn identifiers(&mut self) -> Result<Vec<CollectionId>, AdapterError> {
        self.index.identifiers()
    }
}

/// Newest stored version of `requested`'s major that does not exceed it.
///
/// `None` when `requested` is newer than every stored version of its major.
fn nearest<'a>(requested: &Version, versions: &'a VersionMap) -> Option<&'a PathBuf> {
    let same_major: Vec<(Version, &PathBuf)> = versions
        .iter()
        .filter_map(|(blob, path)| version_of(blob).map(|version| (version, path)))
        .filter(|(version, _)| version.major == requested.major)
        .collect();
    let newest = same_major.iter().map(|(version, _)| version).max()?;
    if newest < requested {
        return None;
    }
    same_major
        .iter()
        .filter(|(version, _)| version <= requested)
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| *path)
}

/// Reads a version string; `1.2` and `1` are completed with zeros.
pub fn parse_semver(text: &str) -> Option<Version> {
    let text = text.trim();
    if let Ok(version) = Version::parse(text) {
        return Some(version);
    }
    let parts = text
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    match parts.as_slice() {
        [major] => Some(Version::new(*major, 0, 0)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        _ => None,
    }
}

/// Semantic version carried by an encoded firmware version value.
pub fn version_of(blob: &[u8]) -> Option<Version> {
    let text = ParameterValue::new([0; 7], blob.to_vec()).text()?;
    parse_semver(&text)
}
