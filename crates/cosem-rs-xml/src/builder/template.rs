use crate::error::AdapterError;
use crate::model::ParameterNode;
use crate::model::template::{
    ComplexNode, SimpleNode, TemplateAttribute, TemplateDocument, TemplateFirmId,
    TemplateManufacturer, TemplateNode, TemplateObject,
};
use crate::parser::parameter_node;
use crate::schema::CURRENT;
use cosem_rs::{Collection, CosemObject, Data, LogicalName, Template};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Converts a template into its document.
///
/// Every requested attribute is taken from the first collection, in order,
/// that holds a value for it. Fails with `TemplateIncomplete` when some
/// requested attribute has no value anywhere.
pub(crate) fn build_template_document(
    template: &Template,
) -> Result<TemplateDocument, AdapterError> {
    let manufacturers = identity_tree(&template.collections)?;

    let mut pending = template.used.clone();
    let mut resolved: BTreeMap<LogicalName, Vec<TemplateAttribute>> = BTreeMap::new();
    let total = template.collections.len();

    for (position, collection) in template.collections.iter().enumerate() {
        for (logical_name, indexes) in pending.iter_mut() {
            let object = match collection.get_object(logical_name) {
                Ok(object) => object,
                Err(e) => {
                    debug!("Collection {position}: {e}");
                    continue;
                }
            };
            indexes.retain(|&index| match object.get_attr(index) {
                Ok(Some(value)) => {
                    resolved
                        .entry(*logical_name)
                        .or_default()
                        .push(encode_attribute(object, index, value));
                    false
                }
                Ok(None) => true,
                Err(e) => {
                    warn!("Collection {position}: {e}");
                    true
                }
            });
        }
        pending.retain(|_, indexes| !indexes.is_empty());
        if pending.is_empty() {
            info!("Template resolved from {} of {total} collections", position + 1);
            break;
        }
    }
    if !pending.is_empty() {
        return Err(AdapterError::TemplateIncomplete { pending });
    }

    let objects = resolved
        .into_iter()
        .map(|(logical_name, mut attributes)| {
            attributes.sort_by_key(|attr| attr.index.parse::<u8>().unwrap_or(u8::MAX));
            TemplateObject {
                ln: logical_name.to_hex(),
                attributes,
            }
        })
        .collect();

    Ok(TemplateDocument {
        version: CURRENT.version.to_string(),
        verified: template.verified.then(|| "1".to_string()),
        manufacturers,
        objects,
    })
}

/// Groups collection identities as manufacturer > firmware id > versions,
/// each listed once.
fn identity_tree(collections: &[Collection]) -> Result<Vec<TemplateManufacturer>, AdapterError> {
    let mut manufacturers: Vec<TemplateManufacturer> = Vec::new();
    for collection in collections {
        let manufacturer = hex::encode(
            collection
                .manufacturer()
                .ok_or(AdapterError::MissingIdentity("manufacturer"))?,
        );
        let firm_id = parameter_node(
            collection
                .firm_id()
                .ok_or(AdapterError::MissingIdentity("firmware id"))?,
        );
        let firm_ver = parameter_node(
            collection
                .firm_ver()
                .ok_or(AdapterError::MissingIdentity("firmware version"))?,
        );

        let m = match manufacturers.iter().position(|m| m.value == manufacturer) {
            Some(m) => m,
            None => {
                manufacturers.push(TemplateManufacturer {
                    value: manufacturer,
                    firm_ids: Vec::new(),
                });
                manufacturers.len() - 1
            }
        };
        let firm_ids = &mut manufacturers[m].firm_ids;
        let f = match firm_ids
            .iter()
            .position(|f| f.par == firm_id.par && f.value == firm_id.value)
        {
            Some(f) => f,
            None => {
                firm_ids.push(TemplateFirmId {
                    par: firm_id.par,
                    value: firm_id.value,
                    versions: Vec::new(),
                });
                firm_ids.len() - 1
            }
        };
        let versions: &mut Vec<ParameterNode> = &mut firm_ids[f].versions;
        if !versions.contains(&firm_ver) {
            versions.push(firm_ver);
        }
    }
    Ok(manufacturers)
}

fn encode_attribute(object: &CosemObject, index: u8, value: &Data) -> TemplateAttribute {
    let name = object
        .attribute_element(index)
        .ok()
        .map(|element| element.name.to_string());
    let (kind, content) = match value {
        Data::Array(items) => ("array", items.iter().map(encode_node).collect()),
        Data::Structure(items) => ("struct", items.iter().map(encode_node).collect()),
        simple => ("simple", vec![encode_node(simple)]),
    };
    TemplateAttribute {
        name,
        index: index.to_string(),
        kind: Some(kind.to_string()),
        content,
    }
}

fn encode_node(value: &Data) -> TemplateNode {
    match value {
        Data::Array(items) => TemplateNode::Array(ComplexNode {
            name: None,
            children: items.iter().map(encode_node).collect(),
        }),
        Data::Structure(items) => TemplateNode::Struct(ComplexNode {
            name: None,
            children: items.iter().map(encode_node).collect(),
        }),
        simple => TemplateNode::Simple(SimpleNode {
            name: None,
            value: hex::encode(simple.encode()),
        }),
    }
}
