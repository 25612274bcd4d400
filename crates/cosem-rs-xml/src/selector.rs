// crates/cosem-rs-xml/src/selector.rs

//! Decides which attributes belong in a type document and which in a data
//! document.
//!
//! A type document describes what every device of a firmware version has
//! in common: static attributes a client may read but not write, plus the
//! chosen type of CHOICE attributes. A data document holds what one device
//! changed relative to its type.

use cosem_rs::{AttributeElement, Classifier, Collection, Data, DataType, LogicalName};
use log::warn;
use std::collections::BTreeSet;

/// Objects never written to a type document.
pub const RESERVED: [LogicalName; 2] = [LogicalName::LDN, LogicalName::CURRENT_ASSOCIATION];

/// An object picked for the type document and its read-only attribute indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedObject {
    pub logical_name: LogicalName,
    pub read_only: BTreeSet<u8>,
}

/// What a type document stores for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCapture {
    /// The full encoded value.
    Value,
    /// Only the decimal type tag of a CHOICE attribute.
    Discriminant,
}

/// Collects the objects listed by every non-current association, merging
/// their read-only attribute sets. Associations come first so their object
/// lists are restored before the objects they list.
pub fn select_type_objects(collection: &Collection) -> Vec<SelectedObject> {
    let mut selected: Vec<SelectedObject> = Vec::new();
    for association in collection.associations().filter(|a| a.logical_name().e() != 0) {
        let list = match association.object_list() {
            Ok(Some(list)) => list,
            Ok(None) => {
                warn!("{} has no object list, skip it", association.logical_name());
                continue;
            }
            Err(e) => {
                warn!("{} object list unreadable: {e}", association.logical_name());
                continue;
            }
        };
        for element in list {
            if RESERVED.contains(&element.logical_name) {
                continue;
            }
            let position = match selected
                .iter()
                .position(|s| s.logical_name == element.logical_name)
            {
                Some(position) => position,
                None => {
                    selected.push(SelectedObject {
                        logical_name: element.logical_name,
                        read_only: BTreeSet::new(),
                    });
                    selected.len() - 1
                }
            };
            selected[position].read_only.extend(
                element
                    .attribute_access
                    .iter()
                    .filter(|access| access.attribute_id != 1)
                    .filter(|access| {
                        access.access_mode.is_readable() && !access.access_mode.is_writable()
                    })
                    .map(|access| access.attribute_id),
            );
        }
    }
    let (mut ordered, rest): (Vec<_>, Vec<_>) = selected.into_iter().partition(|s| {
        collection
            .get_object(&s.logical_name)
            .is_ok_and(|object| object.is_association())
    });
    ordered.extend(rest);
    ordered
}

pub fn type_capture(
    index: u8,
    element: &AttributeElement,
    read_only: &BTreeSet<u8>,
) -> Option<TypeCapture> {
    if index == 1 {
        return None;
    }
    if element.classifier == Classifier::Static
        && (read_only.contains(&index) || element.data_type == DataType::CaptureObjects)
    {
        Some(TypeCapture::Value)
    } else if element.data_type.is_choice() {
        Some(TypeCapture::Discriminant)
    } else {
        None
    }
}

/// True when attribute `index` holds a non-dynamic value that differs from
/// the type's baseline value (or the baseline has none).
pub fn data_capture(
    index: u8,
    element: &AttributeElement,
    value: Option<&Data>,
    baseline: Option<&Data>,
) -> bool {
    if index == 1 || element.classifier == Classifier::Dynamic {
        return false;
    }
    match (value, baseline) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(value), Some(baseline)) => value.encode() != baseline.encode(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosem_rs::association::object_list_to_data;
    use cosem_rs::classes;
    use cosem_rs::{AccessMode, ObjectListElement};

    const CLOCK: LogicalName = LogicalName::new(0, 0, 1, 0, 0, 255);

    fn element(data_type: DataType, classifier: Classifier) -> AttributeElement {
        AttributeElement {
            name: "x",
            data_type,
            classifier,
        }
    }

    #[test]
    fn test_type_capture_rules() {
        let read_only = BTreeSet::from([2u8, 3]);
        let static_long = element(DataType::Simple(16), Classifier::Static);
        assert_eq!(type_capture(2, &static_long, &read_only), Some(TypeCapture::Value));
        assert_eq!(type_capture(4, &static_long, &read_only), None);
        assert_eq!(type_capture(1, &static_long, &read_only), None);

        let capture_objects = element(DataType::CaptureObjects, Classifier::Static);
        assert_eq!(type_capture(4, &capture_objects, &read_only), Some(TypeCapture::Value));

        let dynamic_choice = element(DataType::Choice, Classifier::Dynamic);
        assert_eq!(type_capture(2, &dynamic_choice, &read_only), Some(TypeCapture::Discriminant));
        let static_choice = element(DataType::Choice, Classifier::Static);
        assert_eq!(type_capture(5, &static_choice, &read_only), Some(TypeCapture::Discriminant));
    }

    #[test]
    fn test_data_capture_compares_with_baseline() {
        let static_bool = element(DataType::Simple(3), Classifier::Static);
        let on = Data::Boolean(true);
        let off = Data::Boolean(false);
        assert!(data_capture(8, &static_bool, Some(&on), None));
        assert!(data_capture(8, &static_bool, Some(&on), Some(&off)));
        assert!(!data_capture(8, &static_bool, Some(&on), Some(&on)));
        assert!(!data_capture(8, &static_bool, None, Some(&on)));
        let dynamic = element(DataType::Simple(3), Classifier::Dynamic);
        assert!(!data_capture(2, &dynamic, Some(&on), None));
    }

    #[test]
    fn test_associations_are_selected_first_without_reserved_objects() {
        let mut collection = Collection::new();
        let association = LogicalName::association(3);
        let list = vec![
            ObjectListElement::new(
                classes::CLOCK,
                0,
                CLOCK,
                &[
                    (1, AccessMode::READ_ONLY),
                    (2, AccessMode::READ_AND_WRITE),
                    (3, AccessMode::READ_ONLY),
                ],
            ),
            ObjectListElement::new(
                classes::DATA,
                0,
                LogicalName::LDN,
                &[(2, AccessMode::READ_ONLY)],
            ),
            ObjectListElement::new(
                classes::ASSOCIATION_LN,
                1,
                association,
                &[(2, AccessMode::READ_ONLY)],
            ),
        ];
        collection
            .add_if_missing(classes::ASSOCIATION_LN, 1, association)
            .unwrap()
            .set_value(2, object_list_to_data(&list).unwrap())
            .unwrap();
        collection.register_object_list(&association).unwrap();

        let selected = select_type_objects(&collection);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].logical_name, association);
        assert_eq!(selected[1].logical_name, CLOCK);
        assert_eq!(selected[1].read_only, BTreeSet::from([3]));
    }

    #[test]
    fn test_static_attributes_follow_association_rights() {
        let clock = classes::attributes(classes::CLOCK, 0).unwrap();
        let time_zone = &clock[2];
        assert_eq!(time_zone.classifier, Classifier::Static);

        // Same class description, different rights.
        let granted_read = BTreeSet::from([3u8]);
        let granted_write = BTreeSet::new();
        assert_eq!(type_capture(3, time_zone, &granted_read), Some(TypeCapture::Value));
        assert_eq!(type_capture(3, time_zone, &granted_write), None);
    }
}
