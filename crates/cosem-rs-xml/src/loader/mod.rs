//! Applies parsed documents to a `cosem_rs::Collection`.
//!
//! Each submodule takes one of the internal `model` structs (whatever
//! generation it came from) and fills the collection, collecting per-attribute
//! failures in a `DecodeReport` instead of aborting.

pub mod data_doc;
pub mod header;
pub mod template;
pub mod type_doc;

/// One attribute node as read from any generation: the raw index text and
/// the raw value text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingAttribute {
    pub index: String,
    pub value: String,
}

impl From<&crate::model::TypeAttribute> for PendingAttribute {
    fn from(attr: &crate::model::TypeAttribute) -> Self {
        Self {
            index: attr.index.clone(),
            value: attr.value.clone(),
        }
    }
}

impl From<&crate::model::DataAttribute> for PendingAttribute {
    fn from(attr: &crate::model::DataAttribute) -> Self {
        Self {
            index: attr.index.clone(),
            value: attr.value.clone(),
        }
    }
}
