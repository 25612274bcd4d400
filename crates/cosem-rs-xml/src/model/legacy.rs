//! Contains model structs of the `Objects` documents of generations 3.x, 4.0 and 4.1.
//!
//! One root serves both document kinds of all three generations. The
//! identity header uses text values: the manufacturer as ASCII, the firmware
//! id as hex and the firmware version as a semantic version string.

use super::{DataAttribute, TypeObject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyDocument {
    #[serde(rename = "@version")]
    pub version: String,

    #[serde(default)]
    pub dlms_ver: Option<u8>,
    #[serde(default)]
    pub country: Option<u16>,
    #[serde(default)]
    pub country_ver: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub server_type: Option<String>,
    #[serde(default)]
    pub server_ver: Option<ServerVersion>,

    /// 4.x type nodes.
    #[serde(rename = "obj", default)]
    pub objects: Vec<TypeObject>,
    /// 3.x type nodes and the data nodes of every legacy generation.
    #[serde(rename = "object", default)]
    pub legacy_objects: Vec<LegacyObject>,
}

/// `<server_ver instance="1">1.7.3</server_ver>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVersion {
    #[serde(rename = "@instance", default)]
    pub instance: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyObject {
    #[serde(rename = "@ln")]
    pub ln: String,
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    /// 3.x type documents declare the class of every object.
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// 3.x spelling.
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<DataAttribute>,
    /// 4.x spelling.
    #[serde(rename = "attr", default)]
    pub attrs: Vec<DataAttribute>,
}

impl LegacyObject {
    /// Value nodes in whichever spelling the document used.
    pub fn values(&self) -> impl Iterator<Item = &DataAttribute> {
        self.attributes.iter().chain(&self.attrs)
    }
}
