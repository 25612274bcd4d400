// crates/cosem-rs-xml/tests/common/mod.rs

#![allow(dead_code)]

use cosem_rs::association::object_list_to_data;
use cosem_rs::types::{FIRMWARE_ID_PAR, FIRMWARE_VERSION_PAR};
use cosem_rs::{
    AccessMode, Collection, Data, LogicalName, ObjectListElement, ParameterValue, classes,
};
use cosem_rs_xml::{StorageLayout, XmlAdapter};
use std::fs;
use std::path::{Path, PathBuf};

pub const ASSOCIATION: LogicalName = LogicalName::association(3);
pub const CLOCK: LogicalName = LogicalName::new(0, 0, 1, 0, 0, 255);
pub const ENERGY: LogicalName = LogicalName::new(1, 0, 1, 8, 0, 255);
pub const SERIAL: LogicalName = LogicalName::new(0, 0, 96, 1, 0, 255);
pub const CALENDAR: LogicalName = LogicalName::new(0, 0, 13, 0, 0, 255);

pub const MANUFACTURER: &[u8] = b"KPZ";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Reads a file from the `tests/data/` directory.
pub fn load_test_file(name: &str) -> String {
    let path = test_file_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {:?}: {}", path, e))
}

pub fn test_file_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);
    path
}

pub fn adapter(root: &Path) -> XmlAdapter {
    XmlAdapter::new(StorageLayout::new(root))
}

pub fn firm_id() -> ParameterValue {
    ParameterValue::from_text(FIRMWARE_ID_PAR, "M2M_1")
}

pub fn firm_ver(version: &str) -> ParameterValue {
    ParameterValue::from_text(FIRMWARE_VERSION_PAR, version)
}

/// A meter type as read from a device: association 3 lists itself, a clock,
/// an energy register, the serial number and an activity calendar.
pub fn device_type(version: &str, time_zone: i16) -> Collection {
    let mut collection = Collection::new();
    collection.set_manufacturer(MANUFACTURER.to_vec()).unwrap();
    collection.set_firm_id(firm_id()).unwrap();
    collection.set_firm_ver(firm_ver(version)).unwrap();

    let list = vec![
        ObjectListElement::new(
            classes::ASSOCIATION_LN,
            1,
            ASSOCIATION,
            &[(2, AccessMode::READ_ONLY)],
        ),
        ObjectListElement::new(
            classes::CLOCK,
            0,
            CLOCK,
            &[
                (1, AccessMode::READ_ONLY),
                (2, AccessMode::READ_AND_WRITE),
                (3, AccessMode::READ_ONLY),
                (8, AccessMode::READ_AND_WRITE),
                (9, AccessMode::READ_ONLY),
            ],
        ),
        ObjectListElement::new(
            classes::REGISTER,
            0,
            ENERGY,
            &[(1, AccessMode::READ_ONLY), (2, AccessMode::READ_ONLY), (3, AccessMode::READ_ONLY)],
        ),
        ObjectListElement::new(classes::DATA, 0, SERIAL, &[(2, AccessMode::READ_AND_WRITE)]),
        ObjectListElement::new(
            classes::ACTIVITY_CALENDAR,
            0,
            CALENDAR,
            &[(9, AccessMode::READ_AND_WRITE)],
        ),
    ];
    collection
        .add_if_missing(classes::ASSOCIATION_LN, 1, ASSOCIATION)
        .unwrap()
        .set_value(2, object_list_to_data(&list).unwrap())
        .unwrap();
    collection.register_object_list(&ASSOCIATION).unwrap();

    let clock = collection.get_object_mut(&CLOCK).unwrap();
    clock.set_value(3, Data::Long(time_zone)).unwrap();
    clock.set_value(9, Data::Enum(1)).unwrap();

    let energy = collection.get_object_mut(&ENERGY).unwrap();
    energy.set_value(2, Data::DoubleLongUnsigned(1234)).unwrap();
    energy
        .set_value(3, Data::Structure(vec![Data::Integer(0), Data::Enum(30)]))
        .unwrap();

    collection
        .get_object_mut(&SERIAL)
        .unwrap()
        .set_value(2, Data::OctetString(Vec::new()))
        .unwrap();
    collection
}
