// crates/cosem-rs-xml/src/adapter.rs

//! The adapter contract and its file-backed XML implementation.

use crate::codec::{decode_data, decode_type, encode_data, encode_type};
use crate::config::{AdapterConfig, StorageLayout};
use crate::error::AdapterError;
use crate::library::{CollectionId, VersionResolver};
use crate::parser::read_document;
use crate::report::DecodeReport;
use crate::schema::{CURRENT, SchemaVersion};
use crate::template::{decode_template, encode_template};
use cosem_rs::{Collection, ParameterValue, Template};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};

/// Association whose object list selects the attributes of data documents.
pub const DEFAULT_ASSOCIATION: u8 = 3;

/// Storage backend for device types, device data and templates.
pub trait Adapter {
    /// Name used to route operations to this adapter.
    fn name(&self) -> &str;

    /// Schema generation the adapter writes.
    fn version(&self) -> SchemaVersion;

    /// Stores the type snapshot of `collection` under its identity.
    fn create_type(&mut self, collection: &Collection) -> Result<(), AdapterError>;

    /// Stores what `collection` changed relative to its type.
    ///
    /// # Arguments
    /// * `collection` - A device collection with its logical device name set.
    /// * `association_id` - The association whose object list selects the
    ///   attributes to compare, usually [`DEFAULT_ASSOCIATION`].
    ///
    /// # Returns
    /// `false` when no captured attribute differs from the type; nothing is
    /// written then.
    ///
    /// # Errors
    /// `MissingLdn` or `MissingIdentity` for an incomplete collection, the
    /// resolution errors of [`Adapter::get_collection`], or a model error
    /// when the association is not in the collection.
    fn keep_data(
        &mut self,
        collection: &Collection,
        association_id: u8,
    ) -> Result<bool, AdapterError>;

    /// Applies the stored data of the device to `collection`.
    ///
    /// # Errors
    /// `DataNotFound` when nothing was kept for the device. Attributes that
    /// cannot be applied are listed in the returned report instead.
    fn get_data(&mut self, collection: &mut Collection) -> Result<DecodeReport, AdapterError>;

    /// The type collection for this identity, using the nearest compatible
    /// stored version when the exact one is missing.
    ///
    /// # Arguments
    /// * `manufacturer` - The three-letter manufacturer id as raw bytes.
    /// * `firm_id` - The firmware id parameter read from the device.
    /// * `firm_ver` - The firmware version parameter read from the device.
    ///
    /// # Returns
    /// A fresh copy carrying `firm_ver`, even when a nearby version was used.
    ///
    /// # Errors
    /// `UnsupportedManufacturer`, `UnsupportedType` or `UnsupportedVersion`
    /// when the library has nothing usable for the identity.
    fn get_collection(
        &mut self,
        manufacturer: &[u8],
        firm_id: &ParameterValue,
        firm_ver: &ParameterValue,
    ) -> Result<Collection, AdapterError>;

    /// Stores `template` under `name`. Fails with `TemplateIncomplete`
    /// before anything is written.
    fn create_template(&mut self, name: &str, template: &Template) -> Result<(), AdapterError>;

    /// Loads a template and applies its values to every collection it names.
    fn get_template(&mut self, name: &str) -> Result<Template, AdapterError>;

    /// Names accepted by [`Adapter::get_template`], sorted.
    fn template_names(&mut self) -> Result<Vec<String>, AdapterError>;

    fn collection_identifiers(&mut self) -> Result<Vec<CollectionId>, AdapterError>;
}

/// Reads documents of every generation below a storage root and writes
/// 5.0 documents.
#[derive(Debug)]
pub struct XmlAdapter {
    layout: StorageLayout,
    resolver: VersionResolver,
    /// Decoded type documents by path.
    parents: HashMap<PathBuf, Collection>,
}

impl XmlAdapter {
    /// Creates an adapter over `layout`. Nothing is read until the first
    /// lookup.
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            resolver: VersionResolver::new(layout.types_dir()),
            layout,
            parents: HashMap::new(),
        }
    }

    pub fn from_config(config: &AdapterConfig) -> Self {
        Self::new(config.layout())
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// The decoded type document for this identity, cached by path.
    fn parent(
        &mut self,
        manufacturer: &[u8],
        firm_id: &ParameterValue,
        firm_ver: &ParameterValue,
    ) -> Result<&Collection, AdapterError> {
        let path = self.resolver.resolve(manufacturer, firm_id, firm_ver)?;
        match self.parents.entry(path) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let collection = load_type(entry.key(), manufacturer, firm_id, firm_ver)?;
                Ok(entry.insert(collection))
            }
        }
    }

    fn identity(
        collection: &Collection,
    ) -> Result<(&[u8], &ParameterValue, &ParameterValue), AdapterError> {
        Ok((
            collection
                .manufacturer()
                .ok_or(AdapterError::MissingIdentity("manufacturer"))?,
            collection
                .firm_id()
                .ok_or(AdapterError::MissingIdentity("firmware id"))?,
            collection
                .firm_ver()
                .ok_or(AdapterError::MissingIdentity("firmware version"))?,
        ))
    }
}

fn load_type(
    path: &Path,
    manufacturer: &[u8],
    firm_id: &ParameterValue,
    firm_ver: &ParameterValue,
) -> Result<Collection, AdapterError> {
    info!("Loading type {}", path.display());
    let xml = read_document(path)?;
    let mut collection = Collection::new();
    let report = decode_type(&xml, &mut collection)?;
    if !report.is_complete() {
        warn!(
            "Type {} loaded with {} skipped and {} abandoned attributes",
            path.display(),
            report.skipped.len(),
            report.abandoned
        );
    }
    // Older documents may omit parts of the identity.
    if collection.manufacturer().is_none() {
        collection.set_manufacturer(manufacturer.to_vec())?;
    }
    if collection.firm_id().is_none() {
        collection.set_firm_id(firm_id.clone())?;
    }
    if collection.firm_ver().is_none() {
        collection.set_firm_ver(firm_ver.clone())?;
    }
    Ok(collection)
}

fn write_file(path: &Path, contents: &str) -> Result<(), AdapterError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, contents)?;
    info!("Wrote {}", path.display());
    Ok(())
}

impl Adapter for XmlAdapter {
    fn name(&self) -> &str {
        "xml50"
    }

    fn version(&self) -> SchemaVersion {
        CURRENT.version
    }

    fn create_type(&mut self, collection: &Collection) -> Result<(), AdapterError> {
        let (manufacturer, firm_id, firm_ver) = Self::identity(collection)?;
        let path = self.layout.type_path(manufacturer, firm_id, firm_ver);
        let xml = encode_type(collection)?;
        write_file(&path, &xml)?;
        self.resolver.invalidate();
        self.parents.remove(&path);
        Ok(())
    }

    fn keep_data(
        &mut self,
        collection: &Collection,
        association_id: u8,
    ) -> Result<bool, AdapterError> {
        let path = self
            .layout
            .data_path(collection.ldn().ok_or(AdapterError::MissingLdn)?);
        let (manufacturer, firm_id, firm_ver) = Self::identity(collection)?;
        let parent = self.parent(manufacturer, firm_id, firm_ver)?;
        match encode_data(collection, parent, association_id)? {
            Some(xml) => {
                write_file(&path, &xml)?;
                Ok(true)
            }
            None => {
                warn!("No data to keep for {}: collection matches its type", path.display());
                Ok(false)
            }
        }
    }

    fn get_data(&mut self, collection: &mut Collection) -> Result<DecodeReport, AdapterError> {
        let path = self
            .layout
            .data_path(collection.ldn().ok_or(AdapterError::MissingLdn)?);
        if !path.is_file() {
            return Err(AdapterError::DataNotFound(path));
        }
        debug!("Reading data {}", path.display());
        decode_data(&read_document(&path)?, collection)
    }

    fn get_collection(
        &mut self,
        manufacturer: &[u8],
        firm_id: &ParameterValue,
        firm_ver: &ParameterValue,
    ) -> Result<Collection, AdapterError> {
        let parent = self.parent(manufacturer, firm_id, firm_ver)?;
        Ok(parent.copy_for_version(firm_ver.clone()))
    }

    fn create_template(&mut self, name: &str, template: &Template) -> Result<(), AdapterError> {
        let xml = encode_template(template)?;
        write_file(&self.layout.template_path(name), &xml)
    }

    fn get_template(&mut self, name: &str) -> Result<Template, AdapterError> {
        let path = self.layout.template_path(name);
        if !path.is_file() {
            return Err(AdapterError::TemplateNotFound(name.to_string()));
        }
        let xml = read_document(&path)?;
        decode_template(&xml, |manufacturer, firm_id, firm_ver| {
            self.get_collection(manufacturer, firm_id, firm_ver)
        })
    }

    /// Names accepted by `get_template`: `.xml` files without their
    /// extension, `.tmp` files with it.
    fn template_names(&mut self) -> Result<Vec<String>, AdapterError> {
        let dir = self.layout.templates_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let name = match path.extension().and_then(|e| e.to_str()) {
                Some("xml") => path.file_stem(),
                Some("tmp") => path.file_name(),
                _ => None,
            };
            if let Some(name) = name.and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn collection_identifiers(&mut self) -> Result<Vec<CollectionId>, AdapterError> {
        self.resolver.identifiers()
    }
}
