//! Rebuilds a `Template` from a template document.

use crate::error::AdapterError;
use crate::model::template::{
    LegacyManufacturerItem, LegacyServerTypeItem, LegacyTemplateDocument, TemplateAttribute,
    TemplateDocument, TemplateNode, TemplateObject,
};
use crate::parser::{parse_hex_string, parse_parameter};
use crate::report::AttributeDecodeError;
use cosem_rs::types::{FIRMWARE_ID_PAR, FIRMWARE_VERSION_PAR};
use cosem_rs::{Collection, Data, LogicalName, ParameterValue, Template, UsedAttributes};
use log::{error, info, warn};

/// Identity triple of one collection named in a template header.
pub(crate) type Identity = (Vec<u8>, ParameterValue, ParameterValue);

pub(crate) fn identities(document: &TemplateDocument) -> Result<Vec<Identity>, AdapterError> {
    let mut identities = Vec::new();
    for manufacturer in &document.manufacturers {
        let man = parse_hex_string(&manufacturer.value)?;
        for firm_id in &manufacturer.firm_ids {
            let fid = ParameterValue::new(
                ParameterValue::parse_par(&parse_hex_string(&firm_id.par)?)?,
                parse_hex_string(&firm_id.value)?,
            );
            for version in &firm_id.versions {
                identities.push((man.clone(), fid.clone(), parse_parameter(version)?));
            }
        }
    }
    Ok(identities)
}

/// Reads the mixed-content 4.1 header: manufacturer name, hex server type
/// and version strings.
pub(crate) fn legacy_identities(
    document: &LegacyTemplateDocument,
) -> Result<Vec<Identity>, AdapterError> {
    let mut identities = Vec::new();
    for manufacturer in &document.manufacturers {
        let mut man = Vec::new();
        for item in &manufacturer.items {
            match item {
                LegacyManufacturerItem::Name(name) => man = name.trim().as_bytes().to_vec(),
                LegacyManufacturerItem::ServerType(server_type) => {
                    let mut fid = None;
                    for item in &server_type.items {
                        match item {
                            LegacyServerTypeItem::Id(id) => {
                                let id = parse_hex_string(id)?;
                                fid = Some(ParameterValue::new(FIRMWARE_ID_PAR, id));
                            }
                            LegacyServerTypeItem::Version(version) => {
                                let fid = fid.clone().ok_or_else(|| {
                                    AdapterError::MalformedDocument(
                                        "server_ver before server_type id".to_string(),
                                    )
                                })?;
                                let ver = ParameterValue::from_text(
                                    FIRMWARE_VERSION_PAR,
                                    version.value.trim(),
                                );
                                identities.push((man.clone(), fid, ver));
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(identities)
}

/// Loads every collection named by `identities`. The first identity that
/// cannot be loaded fails the whole template.
pub(crate) fn load_collections<F>(
    identities: Vec<Identity>,
    mut load: F,
) -> Result<Vec<Collection>, AdapterError>
where
    F: FnMut(&[u8], &ParameterValue, &ParameterValue) -> Result<Collection, AdapterError>,
{
    let mut collections = Vec::with_capacity(identities.len());
    for (man, fid, ver) in identities {
        let collection = load(&man, &fid, &ver).inspect_err(|e| {
            error!("Template collection {} {fid} {ver} not loaded: {e}", hex::encode(&man))
        })?;
        collections.push(collection);
    }
    Ok(collections)
}

/// Applies every template value to every collection holding the object and
/// returns the requested attributes.
pub(crate) fn apply_objects(
    objects: &[TemplateObject],
    collections: &mut [Collection],
) -> UsedAttributes {
    let mut used = UsedAttributes::new();
    for object in objects {
        let Ok(logical_name) = object.ln.parse::<LogicalName>() else {
            warn!("Skip template object {:?}: invalid logical name", object.ln);
            continue;
        };
        let indexes = used.entry(logical_name).or_default();
        for attr in &object.attributes {
            let Ok(index) = attr.index.trim().parse::<u8>() else {
                warn!("Skip {logical_name} attribute {:?}: not a number", attr.index);
                continue;
            };
            indexes.insert(index);
            let value = match attribute_value(attr) {
                Ok(value) => value,
                Err(e) => {
                    error!("Template {logical_name} attribute {index}: {e}");
                    continue;
                }
            };
            for collection in collections.iter_mut() {
                match collection.get_object_mut(&logical_name) {
                    Ok(target) => {
                        if let Err(e) = target.set_value(index, value.clone()) {
                            error!("Template {logical_name} attribute {index}: {e}");
                        }
                    }
                    Err(e) => warn!("Template value not applied: {e}"),
                }
            }
        }
    }
    info!("Template applied to {} collections", collections.len());
    used
}

pub(crate) fn attribute_value(attr: &TemplateAttribute) -> Result<Data, AttributeDecodeError> {
    match attr.kind.as_deref().unwrap_or("simple") {
        "simple" => {
            let text: String = attr
                .content
                .iter()
                .filter_map(|node| match node {
                    TemplateNode::Text(text) => Some(text.as_str()),
                    TemplateNode::Simple(simple) => Some(simple.value.as_str()),
                    _ => None,
                })
                .collect();
            simple_value(&text)
        }
        "array" => Ok(Data::Array(node_values(&attr.content)?)),
        "struct" => Ok(Data::Structure(node_values(&attr.content)?)),
        other => Err(AttributeDecodeError::UnknownNode(other.to_string())),
    }
}

fn simple_value(text: &str) -> Result<Data, AttributeDecodeError> {
    let bytes = parse_hex_string(text)
        .map_err(|_| AttributeDecodeError::MalformedHex(text.trim().to_string()))?;
    Ok(Data::decode(&bytes)?)
}

fn node_values(nodes: &[TemplateNode]) -> Result<Vec<Data>, AttributeDecodeError> {
    let mut values = Vec::new();
    for node in nodes {
        match node {
            TemplateNode::Simple(simple) => values.push(simple_value(&simple.value)?),
            TemplateNode::Array(complex) => {
                values.push(Data::Array(node_values(&complex.children)?))
            }
            TemplateNode::Struct(complex) => {
                values.push(Data::Structure(node_values(&complex.children)?))
            }
            TemplateNode::Text(text) if text.trim().is_empty() => {}
            TemplateNode::Text(text) => {
                return Err(AttributeDecodeError::UnknownNode(text.trim().to_string()));
            }
        }
    }
    Ok(values)
}

pub(crate) fn template(
    collections: Vec<Collection>,
    used: UsedAttributes,
    verified: Option<&str>,
) -> Template {
    Template {
        collections,
        used,
        verified: verified.is_some_and(|v| v.trim() == "1"),
    }
}
