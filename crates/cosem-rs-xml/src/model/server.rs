//! Contains model structs of the 5.0 `DLMSServerType` and `DLMSServerData` documents.

use super::{DataAttribute, ParameterNode, TypeObject};
use serde::{Deserialize, Serialize};

/// Root of both 5.0 document kinds; only the root tag tells them apart.
///
/// Type documents fill `objects`, data documents fill `changes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerDocument {
    #[serde(rename = "@version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlms_ver: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_ver: Option<ParameterNode>,
    /// Hex of the manufacturer bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firm_id: Option<ParameterNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firm_ver: Option<ParameterNode>,

    #[serde(rename = "obj", default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<TypeObject>,
    #[serde(rename = "object", default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<DataObject>,
}

/// An `<object ln="..">` node of a data document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataObject {
    #[serde(rename = "@ln")]
    pub ln: String,
    #[serde(rename = "attr", default)]
    pub attributes: Vec<DataAttribute>,
}
