//! Internal `serde` models of the XML documents.
//!
//! One submodule per document family. These structs mirror the XML layout
//! 1:1 and carry no COSEM semantics; `loader` and `builder` translate them
//! to and from `cosem_rs::Collection`.

pub mod legacy;
pub mod server;
pub mod template;

use serde::{Deserialize, Serialize};

/// An identity parameter as hex text: attribute address and encoded value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterNode {
    pub par: String,
    pub value: String,
}

/// An `<attr i="..">` node of a type document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeAttribute {
    #[serde(rename = "@i")]
    pub index: String,
    /// Either a decimal type tag (two characters at most) or the hex
    /// encoding of the full value.
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// An `<obj ln="..">` node of a 4.x or 5.0 type document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeObject {
    #[serde(rename = "@ln")]
    pub ln: String,
    /// Present on Association LN objects only: their class version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ver: Option<u8>,
    #[serde(rename = "attr", default)]
    pub attributes: Vec<TypeAttribute>,
}

/// An `<attr index="..">` (or 3.x `<attribute index="..">`) value node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataAttribute {
    #[serde(rename = "@index")]
    pub index: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}
