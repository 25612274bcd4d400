//! Rebuilds a collection from the object nodes of a type document.

use super::PendingAttribute;
use crate::model::TypeObject;
use crate::model::legacy::LegacyObject;
use crate::parser::parse_hex_string;
use crate::report::{AttributeDecodeError, DecodeReport};
use cosem_rs::classes::ASSOCIATION_LN;
use cosem_rs::{Collection, LogicalName};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Passes over the pending objects before the rest is abandoned.
pub(crate) const MAX_PASSES: usize = 3;

/// How an object node says its object comes into existence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ObjectOrigin {
    /// An Association LN of this class version; created on sight along with
    /// the current association.
    Association { version: u8 },
    /// 3.x nodes name their class and version.
    Declared { class_id: String, version: Option<String> },
    /// Must already exist, created from an association object list.
    Listed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingObject {
    pub ln: String,
    pub origin: ObjectOrigin,
    pub attributes: VecDeque<PendingAttribute>,
}

impl From<&TypeObject> for PendingObject {
    fn from(node: &TypeObject) -> Self {
        Self {
            ln: node.ln.clone(),
            origin: match node.ver {
                Some(version) => ObjectOrigin::Association { version },
                None => ObjectOrigin::Listed,
            },
            attributes: node.attributes.iter().map(PendingAttribute::from).collect(),
        }
    }
}

impl From<&LegacyObject> for PendingObject {
    fn from(node: &LegacyObject) -> Self {
        Self {
            ln: node.ln.clone(),
            origin: match &node.class_id {
                Some(class_id) => ObjectOrigin::Declared {
                    class_id: class_id.clone(),
                    version: node.version.clone(),
                },
                None => ObjectOrigin::Listed,
            },
            attributes: node.values().map(PendingAttribute::from).collect(),
        }
    }
}

/// Applies the object nodes to `collection`.
///
/// An object that does not exist yet is retried on the next pass, since a
/// later association may list it. Attribute errors are final and recorded
/// in the report. After `MAX_PASSES` the remaining objects are abandoned.
pub(crate) fn fill_collection(
    mut pending: Vec<PendingObject>,
    collection: &mut Collection,
) -> DecodeReport {
    let mut report = DecodeReport::default();
    let mut pass = 0;
    while !pending.is_empty() && pass < MAX_PASSES {
        pass += 1;
        debug!("Type decoding pass {pass}: {} objects pending", pending.len());
        pending.retain_mut(|object| !resolve_object(object, collection, &mut report));
    }
    if !pending.is_empty() {
        let lost: Vec<&str> = pending.iter().map(|object| object.ln.as_str()).collect();
        warn!("Not parsed objects after {MAX_PASSES} passes: {}", lost.join(", "));
        for object in &pending {
            report.abandoned += object.attributes.len();
            report.skip(&object.ln, None, AttributeDecodeError::ObjectNotFound);
        }
    } else {
        info!("Type decoded in {pass} passes, {} attributes applied", report.applied);
    }
    report
}

/// Returns `true` when the object is done with, `false` to retry it later.
fn resolve_object(
    object: &mut PendingObject,
    collection: &mut Collection,
    report: &mut DecodeReport,
) -> bool {
    let Ok(logical_name) = object.ln.parse::<LogicalName>() else {
        report.skip(&object.ln, None, AttributeDecodeError::InvalidLogicalName);
        return true;
    };

    if object.origin == ObjectOrigin::Listed {
        if !collection.is_in_collection(&logical_name) {
            return false;
        }
    } else if let Err(e) = create_object(&object.origin, logical_name, collection) {
        report.skip(&object.ln, None, e);
        return true;
    }

    while let Some(attr) = object.attributes.pop_front() {
        match apply_type_attribute(collection, &logical_name, &attr) {
            Ok(()) => report.applied += 1,
            Err(e) => report.skip(&object.ln, Some(&attr.index), e),
        }
    }
    true
}

fn create_object(
    origin: &ObjectOrigin,
    logical_name: LogicalName,
    collection: &mut Collection,
) -> Result<(), AttributeDecodeError> {
    match origin {
        ObjectOrigin::Association { version } => {
            collection.add_if_missing(ASSOCIATION_LN, *version, logical_name)?;
            collection.add_if_missing(ASSOCIATION_LN, *version, LogicalName::CURRENT_ASSOCIATION)?;
        }
        ObjectOrigin::Declared { class_id, version } => {
            let invalid = || AttributeDecodeError::InvalidClass(class_id.clone());
            let class_id: u16 = class_id.trim().parse().map_err(|_| invalid())?;
            let version: u8 = match version {
                Some(version) => version.trim().parse().map_err(|_| invalid())?,
                None => 0,
            };
            collection.add_if_missing(class_id, version, logical_name)?;
        }
        ObjectOrigin::Listed => return Err(AttributeDecodeError::ObjectNotFound),
    }
    Ok(())
}

/// Applies one `attr` node.
///
/// Text of at most two characters is a decimal type tag: it selects the
/// branch of a CHOICE attribute and must equal the fixed tag of any other
/// attribute. Longer text is the hex encoding of the full value.
pub(crate) fn apply_type_attribute(
    collection: &mut Collection,
    logical_name: &LogicalName,
    attr: &PendingAttribute,
) -> Result<(), AttributeDecodeError> {
    let index: u8 = attr
        .index
        .trim()
        .parse()
        .map_err(|_| AttributeDecodeError::InvalidIndex(attr.index.clone()))?;
    let text = attr.value.trim();
    let object = collection.get_object_mut(logical_name)?;
    let data_type = object.attribute_element(index)?.data_type;

    if text.len() <= 2 {
        let tag: u8 = text
            .parse()
            .map_err(|_| AttributeDecodeError::MalformedTag(text.to_string()))?;
        if data_type.is_choice() {
            object.set_choice(index, tag)?;
        } else if data_type.tag() != Some(tag) {
            return Err(AttributeDecodeError::WrongTag {
                expected: data_type,
                found: tag,
            });
        }
        return Ok(());
    }

    let bytes = parse_hex_string(text)
        .map_err(|_| AttributeDecodeError::MalformedHex(text.to_string()))?;
    object.set_attr(index, &bytes)?;
    if object.is_association() && index == 2 {
        let added = collection.register_object_list(logical_name)?;
        debug!("{logical_name} object list added {added} objects");
    }
    Ok(())
}
