// crates/cosem-rs/src/error.rs

use crate::data::DataType;
use crate::types::LogicalName;
use thiserror::Error;

/// Errors raised by the object model while building or mutating a collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CosemError {
    /// The buffer ended before the encoded value was complete.
    #[error("buffer too short: {needed} more bytes needed")]
    BufferTooShort { needed: usize },

    /// The first byte of an encoded value is not a known A-XDR tag.
    #[error("unknown data tag {0}")]
    UnknownTag(u8),

    /// A complete value was decoded but bytes remained.
    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),

    /// Arrays and structures are nested deeper than the decoder accepts.
    #[error("values nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// A length prefix used the long form with an unsupported byte count.
    #[error("invalid length encoding")]
    InvalidLength,

    /// Text could not be read as a logical name.
    #[error("invalid logical name: {0:?}")]
    InvalidLogicalName(String),

    /// No object with this logical name exists in the collection.
    #[error("object {0} not found")]
    ObjectNotFound(LogicalName),

    /// The interface class or class version is not modelled.
    #[error("class {class_id} version {version} is not supported")]
    UnsupportedClass { class_id: u16, version: u8 },

    /// The attribute index is outside the attribute list of the object's class.
    #[error("{logical_name} has no attribute {index}")]
    NoAttribute { logical_name: LogicalName, index: u8 },

    /// The value's kind does not match the attribute's declared data type.
    #[error("{logical_name} attribute {index} expects {expected}, got tag {actual}")]
    TypeMismatch {
        logical_name: LogicalName,
        index: u8,
        expected: DataType,
        actual: u8,
    },

    /// Attribute 1 carries the logical name and follows the object.
    #[error("the logical name attribute is read only")]
    LogicalNameReadOnly,

    /// An identity field was set once and a different value was offered.
    #[error("{0} is already set to a different value")]
    IdentityAlreadySet(&'static str),

    /// An association object list entry does not have the expected shape.
    #[error("malformed object list: {0}")]
    MalformedObjectList(&'static str),
}
