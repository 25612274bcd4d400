//! Serializes collections and templates into 5.0 documents.
//!
//! The submodules convert a `cosem_rs::Collection` into the internal `model`
//! structs; `write_document` turns those into indented XML text.

pub mod data_doc;
pub mod template;
pub mod type_doc;

use crate::error::AdapterError;
use crate::model::server::ServerDocument;
use crate::parser::parameter_node;
use crate::schema::CURRENT;
use cosem_rs::Collection;
use serde::Serialize;

/// Serializes `document` under `root_tag` with an XML declaration and
/// two-space indentation.
pub fn write_document<T: Serialize>(document: &T, root_tag: &str) -> Result<String, AdapterError> {
    let mut buffer = String::new();
    buffer.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    let mut serializer = quick_xml::se::Serializer::with_root(&mut buffer, Some(root_tag))?;
    serializer.indent(' ', 2);

    document.serialize(serializer)?;
    buffer.push('\n');
    Ok(buffer)
}

/// Builds the identity header shared by type and data documents.
pub(crate) fn server_header(collection: &Collection) -> ServerDocument {
    ServerDocument {
        version: CURRENT.version.to_string(),
        dlms_ver: Some(collection.dlms_ver()),
        country: collection.country(),
        country_ver: collection.country_ver().map(parameter_node),
        manufacturer: collection.manufacturer().map(hex::encode),
        firm_id: collection.firm_id().map(parameter_node),
        firm_ver: collection.firm_ver().map(parameter_node),
        ..Default::default()
    }
}
