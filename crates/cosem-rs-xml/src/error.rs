// crates/cosem-rs-xml/src/error.rs

use crate::schema::SchemaVersion;
use cosem_rs::{CosemError, LogicalName, UsedAttributes};
use hex::FromHexError;
use quick_xml::Error as XmlError;
use quick_xml::errors::serialize::{DeError, SeError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing documents or resolving
/// collections from the type library.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// No directory in the type library belongs to this manufacturer.
    #[error("unsupported manufacturer {}", hex::encode(.0))]
    UnsupportedManufacturer(Vec<u8>),

    /// The manufacturer is known but has no such firmware id.
    #[error("manufacturer {} has no type {}", hex::encode(.manufacturer), hex::encode(.firm_id))]
    UnsupportedType { manufacturer: Vec<u8>, firm_id: Vec<u8> },

    /// Neither an exact nor a compatible firmware version is stored.
    #[error("no compatible version for {version} of type {}", hex::encode(.firm_id))]
    UnsupportedVersion { firm_id: Vec<u8>, version: String },

    /// The root tag and version match no known schema generation.
    #[error("unknown schema: <{tag}> version {version:?}")]
    UnknownSchema { tag: String, version: Option<String> },

    /// The schema generation is known but cannot read this kind of document.
    #[error("schema {version} does not support {operation}")]
    NotSupported { operation: &'static str, version: SchemaVersion },

    /// Some requested template attributes have no value in any collection.
    #[error("template is incomplete, unresolved: {}", format_pending(.pending))]
    TemplateIncomplete { pending: UsedAttributes },

    /// A required identity field of the collection is not set.
    #[error("collection has no {0}")]
    MissingIdentity(&'static str),

    /// The collection's logical device name object holds no value.
    #[error("collection has no logical device name")]
    MissingLdn,

    /// The association has no object list to select data attributes from.
    #[error("association {0} has no object list")]
    MissingObjectList(LogicalName),

    /// No data document exists for the device.
    #[error("no stored data at {}", .0.display())]
    DataNotFound(PathBuf),

    /// No template document with this name exists.
    #[error("template {0:?} not found")]
    TemplateNotFound(String),

    /// The document parsed but a header value is not usable.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// No adapter is configured for the operation.
    #[error("no adapter configured for {0}")]
    NoAdapter(&'static str),

    /// An error from the underlying `quick-xml` deserializer.
    #[error("XML parsing error: {0}")]
    XmlParsing(#[from] DeError),

    /// An error from the underlying `quick-xml` serializer.
    #[error("XML serializing error: {0}")]
    XmlSerializing(#[from] SeError),

    /// An error from the `quick-xml` reader while peeking the header.
    #[error("XML reading error: {0}")]
    XmlReading(#[from] XmlError),

    /// A header field contained invalid hex.
    #[error("hex parsing error: {0}")]
    HexParsing(#[from] FromHexError),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Model(#[from] CosemError),
}

fn format_pending(pending: &UsedAttributes) -> String {
    pending
        .iter()
        .map(|(ln, indexes)| {
            let indexes: Vec<String> = indexes.iter().map(u8::to_string).collect();
            format!("{ln}:[{}]", indexes.join(","))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_template_incomplete_lists_pending_attributes() {
        let mut pending = UsedAttributes::new();
        pending.insert(LogicalName::new(0, 0, 1, 0, 0, 255), BTreeSet::from([5, 6]));
        let err = AdapterError::TemplateIncomplete { pending };
        assert_eq!(
            err.to_string(),
            "template is incomplete, unresolved: 0.0.1.0.0.255:[5,6]"
        );
    }

    #[test]
    fn test_manufacturer_is_shown_as_hex() {
        let err = AdapterError::UnsupportedManufacturer(b"KPZ".to_vec());
        assert_eq!(err.to_string(), "unsupported manufacturer 4b505a");
    }
}
