// crates/cosem-rs-xml/src/report.rs

//! Per-attribute outcome of decoding a document into a collection.
//!
//! A bad attribute never aborts a decode: it is logged and recorded here,
//! and the remaining attributes are still applied.

use cosem_rs::{CosemError, DataType};
use log::error;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributeDecodeError {
    /// The logical name text is neither dotted nor 12-digit hex.
    #[error("invalid logical name")]
    InvalidLogicalName,

    /// A 3.x object node declares a class id or version that is not a number.
    #[error("invalid class declaration {0:?}")]
    InvalidClass(String),

    #[error("attribute index {0:?} is not a number")]
    InvalidIndex(String),

    #[error("malformed hex value {0:?}")]
    MalformedHex(String),

    /// A short value is a type tag, and this one is not a decimal number.
    #[error("malformed type tag {0:?}")]
    MalformedTag(String),

    /// The document states a type tag other than the attribute's fixed type.
    #[error("type tag {found} does not match declared {expected}")]
    WrongTag { expected: DataType, found: u8 },

    /// The object does not exist in the target collection.
    #[error("object not found in collection")]
    ObjectNotFound,

    /// A template value node is not one of simple, array or struct.
    #[error("unknown value node {0:?}")]
    UnknownNode(String),

    #[error(transparent)]
    Model(#[from] CosemError),
}

/// An attribute that was left unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedAttribute {
    /// Logical name as written in the document.
    pub logical_name: String,
    /// `None` when the whole object was skipped.
    pub index: Option<String>,
    pub error: AttributeDecodeError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeReport {
    /// Number of attribute values or type tags that were applied.
    pub applied: usize,
    pub skipped: Vec<SkippedAttribute>,
    /// Attributes of objects still unresolved after the last pass.
    pub abandoned: usize,
}

impl DecodeReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.abandoned == 0
    }

    pub(crate) fn skip(
        &mut self,
        logical_name: &str,
        index: Option<&str>,
        error: AttributeDecodeError,
    ) {
        match index {
            Some(index) => error!("Skip {logical_name} attribute {index}: {error}"),
            None => error!("Skip {logical_name}: {error}"),
        }
        self.skipped.push(SkippedAttribute {
            logical_name: logical_name.to_string(),
            index: index.map(str::to_string),
            error,
        });
    }
}
