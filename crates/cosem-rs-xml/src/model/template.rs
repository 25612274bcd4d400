//! Contains model structs of the 5.0 `DLMSServerTemplate` and 4.1
//! `template.objects` documents.

use super::ParameterNode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    #[serde(rename = "@version")]
    pub version: String,
    /// `"1"` once the template was checked against a real device.
    #[serde(rename = "@verified", default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<String>,

    #[serde(rename = "manufacturer", default)]
    pub manufacturers: Vec<TemplateManufacturer>,
    #[serde(rename = "object", default)]
    pub objects: Vec<TemplateObject>,
}

/// Identity tree: manufacturer > firmware id > firmware versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateManufacturer {
    pub value: String,
    #[serde(rename = "firm_id", default)]
    pub firm_ids: Vec<TemplateFirmId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateFirmId {
    pub par: String,
    pub value: String,
    #[serde(rename = "firm_ver", default)]
    pub versions: Vec<ParameterNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateObject {
    #[serde(rename = "@ln")]
    pub ln: String,
    #[serde(rename = "attr", default)]
    pub attributes: Vec<TemplateAttribute>,
}

/// `<attr name=".." index=".." type="simple|array|struct">`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateAttribute {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@index")]
    pub index: String,
    /// Missing means `simple`.
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "$value", default)]
    pub content: Vec<TemplateNode>,
}

/// Content of a template attribute. Simple values are written as a single
/// `<simple>` child; bare hex text is only read, as 4.1 documents have it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateNode {
    #[serde(rename = "simple")]
    Simple(SimpleNode),
    #[serde(rename = "array")]
    Array(ComplexNode),
    #[serde(rename = "struct")]
    Struct(ComplexNode),
    #[serde(rename = "$text", skip_serializing)]
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleNode {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexNode {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "$value", default)]
    pub children: Vec<TemplateNode>,
}

/// 4.1 template root. The identity header is mixed content:
/// `<manufacturer>KPZ<server_type>..<server_ver>1.4.0</server_ver></server_type></manufacturer>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyTemplateDocument {
    #[serde(rename = "@version")]
    pub version: String,
    #[serde(rename = "@verified", default)]
    pub verified: Option<String>,
    #[serde(rename = "manufacturer", default)]
    pub manufacturers: Vec<LegacyTemplateManufacturer>,
    #[serde(rename = "object", default)]
    pub objects: Vec<TemplateObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyTemplateManufacturer {
    #[serde(rename = "$value", default)]
    pub items: Vec<LegacyManufacturerItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum LegacyManufacturerItem {
    #[serde(rename = "$text")]
    Name(String),
    #[serde(rename = "server_type")]
    ServerType(LegacyServerType),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyServerType {
    #[serde(rename = "$value", default)]
    pub items: Vec<LegacyServerTypeItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum LegacyServerTypeItem {
    #[serde(rename = "$text")]
    Id(String),
    #[serde(rename = "server_ver")]
    Version(super::legacy::ServerVersion),
}
