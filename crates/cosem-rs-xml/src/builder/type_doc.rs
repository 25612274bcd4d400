use super::server_header;
use crate::error::AdapterError;
use crate::model::server::ServerDocument;
use crate::model::{TypeAttribute, TypeObject};
use crate::selector::{TypeCapture, select_type_objects, type_capture};
use cosem_rs::Collection;
use log::{debug, error, warn};

/// Converts a collection into its type document.
///
/// Objects that end up without a captured attribute are left out; they
/// are restored from the association object list on decode.
pub(crate) fn build_type_document(collection: &Collection) -> Result<ServerDocument, AdapterError> {
    let mut document = server_header(collection);

    for selected in select_type_objects(collection) {
        let object = match collection.get_object(&selected.logical_name) {
            Ok(object) => object,
            Err(e) => {
                warn!("Skip {}: {e}", selected.logical_name);
                continue;
            }
        };
        let logical_name = object.logical_name();
        let mut node = TypeObject {
            ln: logical_name.to_hex(),
            ver: object.is_association().then_some(object.version()),
            attributes: Vec::new(),
        };

        for (index, element, value) in object.attributes() {
            let Some(capture) = type_capture(index, element, &selected.read_only) else {
                continue;
            };
            let Some(value) = value else {
                error!(
                    "For {logical_name} attribute {index} ({}) not set, value is absent",
                    element.name
                );
                continue;
            };
            let text = match capture {
                TypeCapture::Value => hex::encode(value.encode()),
                TypeCapture::Discriminant => value.tag().to_string(),
            };
            node.attributes.push(TypeAttribute {
                index: index.to_string(),
                value: text,
            });
        }

        if node.attributes.is_empty() {
            debug!("{logical_name} has no type attributes");
        } else {
            document.objects.push(node);
        }
    }
    Ok(document)
}
