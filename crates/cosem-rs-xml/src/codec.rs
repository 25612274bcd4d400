// crates/cosem-rs-xml/src/codec.rs

//! Encoding collections to documents and decoding documents into collections.
//!
//! Decoding accepts every generation in the schema chain. Encoding always
//! produces the current (5.0) layout.

use crate::builder::data_doc::build_data_document;
use crate::builder::type_doc::build_type_document;
use crate::builder::write_document;
use crate::error::AdapterError;
use crate::loader::data_doc::{DataEntry, fill_data};
use crate::loader::header::{apply_legacy_header, apply_server_header};
use crate::loader::type_doc::{PendingObject, fill_collection};
use crate::model::legacy::LegacyDocument;
use crate::model::server::ServerDocument;
use crate::report::DecodeReport;
use crate::schema::{self, CURRENT, DocumentKind, Generation};
use cosem_rs::Collection;
use log::debug;

/// Serializes the type snapshot of `collection`.
pub fn encode_type(collection: &Collection) -> Result<String, AdapterError> {
    let document = build_type_document(collection)?;
    write_document(&document, CURRENT.type_root_tag)
}

/// Serializes what `collection` changed relative to its type `parent`,
/// restricted to objects listed by association `association_id`.
///
/// Returns `None` when nothing differs.
pub fn encode_data(
    collection: &Collection,
    parent: &Collection,
    association_id: u8,
) -> Result<Option<String>, AdapterError> {
    match build_data_document(collection, parent, association_id)? {
        Some(document) => Ok(Some(write_document(&document, CURRENT.data_root_tag)?)),
        None => Ok(None),
    }
}

/// Fills `collection` from a type document of any generation.
///
/// Header fields are applied first; identity fields already set on the
/// collection must agree with the document.
pub fn decode_type(xml: &str, collection: &mut Collection) -> Result<DecodeReport, AdapterError> {
    let header = schema::read_header(xml)?;
    let schema = schema::select(&header, DocumentKind::Type)?;
    debug!("Decoding type document with schema {}", schema.version);

    let pending: Vec<PendingObject> = match schema.generation {
        Generation::V50 => {
            let document: ServerDocument = quick_xml::de::from_str(xml)?;
            apply_server_header(&document, collection)?;
            document.objects.iter().map(PendingObject::from).collect()
        }
        Generation::V41 | Generation::V40 => {
            let document: LegacyDocument = quick_xml::de::from_str(xml)?;
            apply_legacy_header(&document, collection)?;
            document.objects.iter().map(PendingObject::from).collect()
        }
        Generation::Legacy3 => {
            let document: LegacyDocument = quick_xml::de::from_str(xml)?;
            apply_legacy_header(&document, collection)?;
            document.legacy_objects.iter().map(PendingObject::from).collect()
        }
    };
    Ok(fill_collection(pending, collection))
}

/// Applies a data document of any generation to `collection`.
pub fn decode_data(xml: &str, collection: &mut Collection) -> Result<DecodeReport, AdapterError> {
    let header = schema::read_header(xml)?;
    let schema = schema::select(&header, DocumentKind::Data)?;
    debug!("Decoding data document with schema {}", schema.version);

    let entries: Vec<DataEntry> = match schema.generation {
        Generation::V50 => {
            let document: ServerDocument = quick_xml::de::from_str(xml)?;
            apply_server_header(&document, collection)?;
            document.changes.iter().map(DataEntry::from).collect()
        }
        Generation::V41 | Generation::V40 | Generation::Legacy3 => {
            let document: LegacyDocument = quick_xml::de::from_str(xml)?;
            apply_legacy_header(&document, collection)?;
            document.legacy_objects.iter().map(DataEntry::from).collect()
        }
    };
    Ok(fill_data(&entries, collection))
}
