// crates/cosem-rs/src/collection.rs

use crate::classes;
use crate::data::Data;
use crate::error::CosemError;
use crate::object::CosemObject;
use crate::types::{LogicalName, ParameterValue};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// The DLMS version servers report when the document does not say.
pub const DEFAULT_DLMS_VERSION: u8 = 6;

/// The set of objects of one device (or device type) plus its identity.
///
/// Manufacturer, firmware id and firmware version can each be set once;
/// setting them again to the same value is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    manufacturer: Option<Vec<u8>>,
    firm_id: Option<ParameterValue>,
    firm_ver: Option<ParameterValue>,
    dlms_ver: u8,
    country: Option<u16>,
    country_ver: Option<ParameterValue>,
    objects: BTreeMap<LogicalName, CosemObject>,
}

fn set_once<T: PartialEq>(
    slot: &mut Option<T>,
    value: T,
    field: &'static str,
) -> Result<(), CosemError> {
    match slot {
        Some(current) if *current != value => Err(CosemError::IdentityAlreadySet(field)),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Creates an empty collection holding only the logical device name object.
    pub fn new() -> Self {
        let mut objects = BTreeMap::new();
        if let Ok(ldn) = CosemObject::new(classes::DATA, 0, LogicalName::LDN) {
            objects.insert(LogicalName::LDN, ldn);
        }
        Self {
            manufacturer: None,
            firm_id: None,
            firm_ver: None,
            dlms_ver: DEFAULT_DLMS_VERSION,
            country: None,
            country_ver: None,
            objects,
        }
    }

    pub fn manufacturer(&self) -> Option<&[u8]> {
        self.manufacturer.as_deref()
    }

    pub fn firm_id(&self) -> Option<&ParameterValue> {
        self.firm_id.as_ref()
    }

    pub fn firm_ver(&self) -> Option<&ParameterValue> {
        self.firm_ver.as_ref()
    }

    pub fn dlms_ver(&self) -> u8 {
        self.dlms_ver
    }

    pub fn country(&self) -> Option<u16> {
        self.country
    }

    pub fn country_ver(&self) -> Option<&ParameterValue> {
        self.country_ver.as_ref()
    }

    pub fn set_manufacturer(&mut self, value: Vec<u8>) -> Result<(), CosemError> {
        set_once(&mut self.manufacturer, value, "manufacturer")
    }

    pub fn set_firm_id(&mut self, value: ParameterValue) -> Result<(), CosemError> {
        set_once(&mut self.firm_id, value, "firmware id")
    }

    pub fn set_firm_ver(&mut self, value: ParameterValue) -> Result<(), CosemError> {
        set_once(&mut self.firm_ver, value, "firmware version")
    }

    pub fn set_dlms_ver(&mut self, value: u8) {
        self.dlms_ver = value;
    }

    pub fn set_country(&mut self, value: u16) {
        self.country = Some(value);
    }

    pub fn set_country_ver(&mut self, value: ParameterValue) {
        self.country_ver = Some(value);
    }

    /// A copy of this collection for another firmware version of the same type.
    pub fn copy_for_version(&self, firm_ver: ParameterValue) -> Collection {
        let mut copy = self.clone();
        copy.firm_ver = Some(firm_ver);
        copy
    }

    pub fn is_in_collection(&self, logical_name: &LogicalName) -> bool {
        self.objects.contains_key(logical_name)
    }

    pub fn get_object(&self, logical_name: &LogicalName) -> Result<&CosemObject, CosemError> {
        self.objects
            .get(logical_name)
            .ok_or(CosemError::ObjectNotFound(*logical_name))
    }

    pub fn get_object_mut(
        &mut self,
        logical_name: &LogicalName,
    ) -> Result<&mut CosemObject, CosemError> {
        self.objects
            .get_mut(logical_name)
            .ok_or(CosemError::ObjectNotFound(*logical_name))
    }

    /// Returns the object under `logical_name`, creating it first if absent.
    ///
    /// An existing object is returned as is even when its class differs.
    pub fn add_if_missing(
        &mut self,
        class_id: u16,
        version: u8,
        logical_name: LogicalName,
    ) -> Result<&mut CosemObject, CosemError> {
        if !self.objects.contains_key(&logical_name) {
            let object = CosemObject::new(class_id, version, logical_name)?;
            debug!(
                "Add {} {logical_name} to collection",
                classes::class_name(class_id)
            );
            self.objects.insert(logical_name, object);
        }
        self.get_object_mut(&logical_name)
    }

    pub fn objects(&self) -> impl Iterator<Item = &CosemObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn associations(&self) -> impl Iterator<Item = &CosemObject> {
        self.objects.values().filter(|object| object.is_association())
    }

    /// The Association LN object with instance `id` (0.0.40.0.id.255).
    pub fn association(&self, id: u8) -> Result<&CosemObject, CosemError> {
        self.get_object(&LogicalName::association(id))
    }

    /// Creates every object listed in the `object_list` of association
    /// `logical_name`. Entries of unsupported classes are skipped.
    ///
    /// Returns the number of objects that were added.
    pub fn register_object_list(
        &mut self,
        logical_name: &LogicalName,
    ) -> Result<usize, CosemError> {
        let Some(list) = self.get_object(logical_name)?.object_list()? else {
            return Ok(0);
        };
        let mut added = 0;
        for element in list {
            if self.is_in_collection(&element.logical_name) {
                continue;
            }
            match self.add_if_missing(element.class_id, element.version, element.logical_name) {
                Ok(_) => added += 1,
                Err(e) => warn!(
                    "Skip {} from {logical_name} object list: {e}",
                    element.logical_name
                ),
            }
        }
        Ok(added)
    }

    /// Value of the logical device name object.
    pub fn ldn(&self) -> Option<&[u8]> {
        self.get_object(&LogicalName::LDN)
            .ok()?
            .get_attr(2)
            .ok()
            .flatten()
            .and_then(Data::as_bytes)
    }

    pub fn set_ldn(&mut self, ldn: &[u8]) -> Result<(), CosemError> {
        self.add_if_missing(classes::DATA, 0, LogicalName::LDN)?
            .set_value(2, Data::OctetString(ldn.to_vec()))
    }
}

/// Requested attribute indexes per object.
pub type UsedAttributes = BTreeMap<LogicalName, BTreeSet<u8>>;

/// A reusable set of attribute values taken from one or more collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    pub collections: Vec<Collection>,
    pub used: UsedAttributes,
    pub verified: bool,
}

impl Template {
    pub fn new(collections: Vec<Collection>, used: UsedAttributes) -> Self {
        Self {
            collections,
            used,
            verified: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AccessMode, ObjectListElement, object_list_to_data};
    use crate::types::{FIRMWARE_ID_PAR, FIRMWARE_VERSION_PAR};

    #[test]
    fn test_new_collection_has_ldn_object() {
        let mut collection = Collection::new();
        assert!(collection.is_in_collection(&LogicalName::LDN));
        assert_eq!(collection.ldn(), None);
        collection.set_ldn(b"KPZ01").unwrap();
        assert_eq!(collection.ldn(), Some(&b"KPZ01"[..]));
    }

    #[test]
    fn test_identity_is_set_once() {
        let mut collection = Collection::new();
        collection.set_manufacturer(b"KPZ".to_vec()).unwrap();
        collection.set_manufacturer(b"KPZ".to_vec()).unwrap();
        assert_eq!(
            collection.set_manufacturer(b"XYZ".to_vec()),
            Err(CosemError::IdentityAlreadySet("manufacturer"))
        );

        let fid = ParameterValue::from_text(FIRMWARE_ID_PAR, "M2M_1");
        collection.set_firm_id(fid.clone()).unwrap();
        let other = ParameterValue::from_text(FIRMWARE_ID_PAR, "M2M_3");
        assert!(collection.set_firm_id(other).is_err());
        assert_eq!(collection.firm_id(), Some(&fid));
    }

    #[test]
    fn test_copy_for_version_replaces_only_version() {
        let mut collection = Collection::new();
        collection.set_manufacturer(b"KPZ".to_vec()).unwrap();
        collection
            .set_firm_ver(ParameterValue::from_text(FIRMWARE_VERSION_PAR, "1.4.0"))
            .unwrap();
        let requested = ParameterValue::from_text(FIRMWARE_VERSION_PAR, "1.5.0");
        let copy = collection.copy_for_version(requested.clone());
        assert_eq!(copy.firm_ver(), Some(&requested));
        assert_eq!(copy.manufacturer(), Some(&b"KPZ"[..]));
        assert_eq!(copy.len(), collection.len());
    }

    #[test]
    fn test_register_object_list_adds_listed_objects() {
        let mut collection = Collection::new();
        let association = LogicalName::association(3);
        let list = vec![
            ObjectListElement::new(
                8,
                0,
                LogicalName::new(0, 0, 1, 0, 0, 255),
                &[(1, AccessMode::READ_ONLY)],
            ),
            ObjectListElement::new(
                3,
                0,
                LogicalName::new(1, 0, 1, 8, 0, 255),
                &[(1, AccessMode::READ_ONLY)],
            ),
            // Unsupported class, skipped with a warning.
            ObjectListElement::new(9, 0, LogicalName::new(0, 0, 10, 0, 0, 255), &[]),
        ];
        collection
            .add_if_missing(classes::ASSOCIATION_LN, 1, association)
            .unwrap()
            .set_value(2, object_list_to_data(&list).unwrap())
            .unwrap();

        assert_eq!(collection.register_object_list(&association), Ok(2));
        assert!(collection.is_in_collection(&LogicalName::new(0, 0, 1, 0, 0, 255)));
        assert_eq!(
            collection
                .get_object(&LogicalName::new(1, 0, 1, 8, 0, 255))
                .unwrap()
                .class_id(),
            classes::REGISTER
        );
        assert_eq!(collection.associations().count(), 1);
        assert!(collection.association(3).is_ok());
        assert_eq!(
            collection.association(2).unwrap_err(),
            CosemError::ObjectNotFound(LogicalName::association(2))
        );
    }
}
