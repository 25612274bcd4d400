// crates/cosem-rs-xml/src/template.rs

//! Templates: attribute values shared by several device types.
//!
//! A template is written from the first collection that holds each
//! requested value. Loading resolves every collection named in the header
//! and writes every stored value into all of them.

use crate::builder::template::build_template_document;
use crate::builder::write_document;
use crate::error::AdapterError;
use crate::loader::template::{
    apply_objects, identities, legacy_identities, load_collections, template,
};
use crate::model::template::{LegacyTemplateDocument, TemplateDocument};
use crate::schema::{self, CURRENT, DocumentKind, Generation};
use cosem_rs::{Collection, ParameterValue, Template};
use log::debug;

/// Serializes `template` as a 5.0 `DLMSServerTemplate` document.
///
/// Fails with `TemplateIncomplete` when some requested attribute has no
/// value in any of the template's collections; nothing is produced then.
pub fn encode_template(template: &Template) -> Result<String, AdapterError> {
    let document = build_template_document(template)?;
    let root = CURRENT
        .template_root_tag
        .ok_or(AdapterError::NotSupported {
            operation: "templates",
            version: CURRENT.version,
        })?;
    write_document(&document, root)
}

/// Rebuilds a template from a 5.0 or 4.1 document.
///
/// `load` supplies the collection for each identity in the header.
///
/// # Errors
///
/// The error of the first identity `load` cannot resolve, typically
/// `UnsupportedManufacturer`, `UnsupportedType` or `UnsupportedVersion`.
/// No partially loaded template is returned.
pub fn decode_template<F>(xml: &str, load: F) -> Result<Template, AdapterError>
where
    F: FnMut(&[u8], &ParameterValue, &ParameterValue) -> Result<Collection, AdapterError>,
{
    let header = schema::read_header(xml)?;
    let schema = schema::select(&header, DocumentKind::Template)?;
    debug!("Decoding template with schema {}", schema.version);

    match schema.generation {
        Generation::V50 => {
            let document: TemplateDocument = quick_xml::de::from_str(xml)?;
            let mut collections = load_collections(identities(&document)?, load)?;
            let used = apply_objects(&document.objects, &mut collections);
            Ok(template(collections, used, document.verified.as_deref()))
        }
        Generation::V41 => {
            let document: LegacyTemplateDocument = quick_xml::de::from_str(xml)?;
            let mut collections = load_collections(legacy_identities(&document)?, load)?;
            let used = apply_objects(&document.objects, &mut collections);
            Ok(template(collections, used, document.verified.as_deref()))
        }
        Generation::V40 | Generation::Legacy3 => Err(AdapterError::NotSupported {
            operation: "templates",
            version: schema.version,
        }),
    }
}
