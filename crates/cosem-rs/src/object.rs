// crates/cosem-rs/src/object.rs

use crate::association::{self, ObjectListElement};
use crate::classes;
use crate::data::{Data, DataType};
use crate::error::CosemError;
use crate::types::LogicalName;

/// Whether an attribute describes the device type or changes while it runs.
///
/// Writability is not part of the class description: it is granted per
/// association through [`AccessMode`](crate::AccessMode) in the object list,
/// and the same attribute may be read-only in one association and writable
/// in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// Configuration and identity; identical across devices of one type.
    Static,
    /// Measurements, clocks and other live state.
    Dynamic,
}

/// Class-level description of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeElement {
    pub name: &'static str,
    pub data_type: DataType,
    pub classifier: Classifier,
}

/// One instance of an interface class with its current attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct CosemObject {
    logical_name: LogicalName,
    class_id: u16,
    version: u8,
    elements: &'static [AttributeElement],
    values: Vec<Option<Data>>,
}

impl CosemObject {
    /// Creates an object of a known class. Only the logical name is set.
    pub fn new(class_id: u16, version: u8, logical_name: LogicalName) -> Result<Self, CosemError> {
        let elements = classes::attributes(class_id, version)?;
        let mut values = vec![None; elements.len()];
        values[0] = Some(Data::OctetString(logical_name.0.to_vec()));
        Ok(Self {
            logical_name,
            class_id,
            version,
            elements,
            values,
        })
    }

    pub fn logical_name(&self) -> LogicalName {
        self.logical_name
    }

    pub fn class_id(&self) -> u16 {
        self.class_id
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn is_association(&self) -> bool {
        self.class_id == classes::ASSOCIATION_LN
    }

    /// Description of attribute `index` (1-based).
    pub fn attribute_element(&self, index: u8) -> Result<&AttributeElement, CosemError> {
        usize::from(index)
            .checked_sub(1)
            .and_then(|i| self.elements.get(i))
            .ok_or(CosemError::NoAttribute {
                logical_name: self.logical_name,
                index,
            })
    }

    /// Current value of attribute `index`, `None` when it was never set.
    pub fn get_attr(&self, index: u8) -> Result<Option<&Data>, CosemError> {
        self.attribute_element(index)?;
        Ok(self.values[usize::from(index) - 1].as_ref())
    }

    /// Every attribute with its description and value, in index order.
    pub fn attributes(&self) -> impl Iterator<Item = (u8, &AttributeElement, Option<&Data>)> + '_ {
        self.elements
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (element, value))| (i as u8 + 1, element, value.as_ref()))
    }

    /// Decodes `encoded` and stores it in attribute `index`.
    pub fn set_attr(&mut self, index: u8, encoded: &[u8]) -> Result<(), CosemError> {
        let data = Data::decode(encoded)?;
        self.set_value(index, data)
    }

    pub fn set_value(&mut self, index: u8, data: Data) -> Result<(), CosemError> {
        if index == 1 {
            return Err(CosemError::LogicalNameReadOnly);
        }
        let element = self.attribute_element(index)?;
        if !element.data_type.accepts(&data) {
            return Err(CosemError::TypeMismatch {
                logical_name: self.logical_name,
                index,
                expected: element.data_type,
                actual: data.tag(),
            });
        }
        self.values[usize::from(index) - 1] = Some(data);
        Ok(())
    }

    /// Selects the CHOICE branch `tag` of attribute `index`.
    ///
    /// A value that already carries `tag` is kept; otherwise the branch's
    /// default value is stored.
    pub fn set_choice(&mut self, index: u8, tag: u8) -> Result<(), CosemError> {
        if self.get_attr(index)?.is_some_and(|value| value.tag() == tag) {
            return Ok(());
        }
        self.set_value(index, Data::default_for_tag(tag)?)
    }

    /// Parsed `object_list` of an Association LN, `None` when it is unset.
    pub fn object_list(&self) -> Result<Option<Vec<ObjectListElement>>, CosemError> {
        if !self.is_association() {
            return Err(CosemError::NoAttribute {
                logical_name: self.logical_name,
                index: 2,
            });
        }
        self.get_attr(2)?
            .map(association::object_list_from_data)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tag;

    fn clock() -> CosemObject {
        CosemObject::new(classes::CLOCK, 0, LogicalName::new(0, 0, 1, 0, 0, 255)).unwrap()
    }

    #[test]
    fn test_new_object_carries_logical_name() {
        let object = clock();
        assert_eq!(
            object.get_attr(1).unwrap(),
            Some(&Data::OctetString(vec![0, 0, 1, 0, 0, 255]))
        );
        assert_eq!(object.get_attr(3).unwrap(), None);
        assert!(object.get_attr(10).is_err());
        assert!(object.get_attr(0).is_err());
    }

    #[test]
    fn test_set_attr_checks_declared_type() {
        let mut object = clock();
        object.set_attr(3, &[0x10, 0x00, 0xb4]).unwrap();
        assert_eq!(object.get_attr(3).unwrap(), Some(&Data::Long(180)));

        let err = object.set_value(3, Data::Unsigned(1)).unwrap_err();
        assert!(matches!(err, CosemError::TypeMismatch { index: 3, actual: 17, .. }));
        assert_eq!(
            object.set_value(1, Data::OctetString(vec![])),
            Err(CosemError::LogicalNameReadOnly)
        );
    }

    #[test]
    fn test_set_choice_keeps_value_of_same_branch() {
        let mut object =
            CosemObject::new(classes::REGISTER, 0, LogicalName::new(1, 0, 1, 8, 0, 255)).unwrap();
        object.set_choice(2, tag::DOUBLE_LONG_UNSIGNED).unwrap();
        assert_eq!(object.get_attr(2).unwrap(), Some(&Data::DoubleLongUnsigned(0)));

        object.set_value(2, Data::DoubleLongUnsigned(42)).unwrap();
        object.set_choice(2, tag::DOUBLE_LONG_UNSIGNED).unwrap();
        assert_eq!(object.get_attr(2).unwrap(), Some(&Data::DoubleLongUnsigned(42)));

        object.set_choice(2, tag::LONG64).unwrap();
        assert_eq!(object.get_attr(2).unwrap(), Some(&Data::Long64(0)));
    }

    #[test]
    fn test_attributes_iterates_in_index_order() {
        let indexes: Vec<u8> = clock().attributes().map(|(i, _, _)| i).collect();
        assert_eq!(indexes, (1..=9).collect::<Vec<u8>>());
    }
}
