use super::server_header;
use crate::error::AdapterError;
use crate::model::DataAttribute;
use crate::model::server::{DataObject, ServerDocument};
use crate::selector::data_capture;
use cosem_rs::{Collection, LogicalName};
use log::warn;

/// Converts the difference between `collection` and its type `parent` into
/// a data document.
///
/// Only objects listed by association `association_id` are considered.
/// Returns `None` when no attribute differs.
pub(crate) fn build_data_document(
    collection: &Collection,
    parent: &Collection,
    association_id: u8,
) -> Result<Option<ServerDocument>, AdapterError> {
    let association = collection.association(association_id)?;
    let list = association
        .object_list()?
        .ok_or(AdapterError::MissingObjectList(LogicalName::association(association_id)))?;

    let mut document = server_header(collection);
    for element in list {
        let object = match collection.get_object(&element.logical_name) {
            Ok(object) => object,
            Err(e) => {
                warn!("Skip {} from object list: {e}", element.logical_name);
                continue;
            }
        };
        let baseline = parent.get_object(&element.logical_name).ok();

        let mut node = DataObject {
            ln: element.logical_name.to_hex(),
            attributes: Vec::new(),
        };
        for access in &element.attribute_access {
            let index = access.attribute_id;
            let Ok(attribute) = object.attribute_element(index) else {
                warn!("{} has no attribute {index}", element.logical_name);
                continue;
            };
            let value = object.get_attr(index).ok().flatten();
            let base = baseline.and_then(|b| b.get_attr(index).ok().flatten());
            if let Some(value) = value.filter(|v| data_capture(index, attribute, Some(*v), base)) {
                node.attributes.push(DataAttribute {
                    index: index.to_string(),
                    value: hex::encode(value.encode()),
                });
            }
        }
        if !node.attributes.is_empty() {
            document.changes.push(node);
        }
    }

    Ok((!document.changes.is_empty()).then_some(document))
}
