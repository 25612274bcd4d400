// crates/cosem-rs-xml/tests/library.rs

mod common;

use common::*;
use cosem_rs::types::FIRMWARE_ID_PAR;
use cosem_rs::{Collection, Data, ParameterValue};
use cosem_rs_xml::{
    Adapter, AdapterConfig, AdapterError, AdapterPool, DEFAULT_ASSOCIATION, XmlAdapter,
};
use std::fs;

#[test]
fn test_type_roundtrip_through_the_library() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut adapter = adapter(dir.path());
    let original = device_type("1.7.3", 60);

    adapter.create_type(&original).unwrap();
    let path = dir
        .path()
        .join("Types/4b505a/09054d324d5f31/0905312e372e33.xml");
    let first = fs::read_to_string(&path).unwrap();

    let restored = adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.7.3"))
        .unwrap();
    assert_eq!(restored.firm_ver(), Some(&firm_ver("1.7.3")));

    // Read-only static values are restored as they were.
    let clock = restored.get_object(&CLOCK).unwrap();
    assert_eq!(clock.get_attr(3).unwrap(), Some(&Data::Long(60)));
    assert_eq!(clock.get_attr(9).unwrap(), Some(&Data::Enum(1)));
    assert_eq!(clock.get_attr(8).unwrap(), None);
    let energy = restored.get_object(&ENERGY).unwrap();
    assert_eq!(
        energy.get_attr(3).unwrap(),
        Some(&Data::Structure(vec![Data::Integer(0), Data::Enum(30)]))
    );
    // CHOICE attributes keep their type only.
    assert_eq!(energy.get_attr(2).unwrap(), Some(&Data::DoubleLongUnsigned(0)));
    assert_eq!(
        restored.get_object(&SERIAL).unwrap().get_attr(2).unwrap(),
        Some(&Data::OctetString(Vec::new()))
    );
    assert!(restored.is_in_collection(&CALENDAR));

    // Writing the same type again yields the same document.
    adapter.create_type(&original).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
    adapter.create_type(&restored).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn test_nearest_version_lookup() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut adapter = adapter(dir.path());
    for (version, time_zone) in [("1.2.0", 0), ("1.4.0", 60), ("1.7.3", 120)] {
        adapter.create_type(&device_type(version, time_zone)).unwrap();
    }
    assert_eq!(adapter.collection_identifiers().unwrap().len(), 3);

    let time_zone = |collection: &Collection| {
        collection.get_object(&CLOCK).unwrap().get_attr(3).unwrap().cloned()
    };

    let nearest = adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.5.0"))
        .unwrap();
    assert_eq!(time_zone(&nearest), Some(Data::Long(60)));
    assert_eq!(nearest.firm_ver(), Some(&firm_ver("1.5.0")));

    let exact = adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.7.3"))
        .unwrap();
    assert_eq!(time_zone(&exact), Some(Data::Long(120)));

    assert!(matches!(
        adapter.get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.8.0")),
        Err(AdapterError::UnsupportedVersion { .. })
    ));
    let unknown_type = ParameterValue::from_text(FIRMWARE_ID_PAR, "M2M_2");
    assert!(matches!(
        adapter.get_collection(MANUFACTURER, &unknown_type, &firm_ver("1.7.3")),
        Err(AdapterError::UnsupportedType { .. })
    ));
    assert!(matches!(
        adapter.get_collection(b"ABC", &firm_id(), &firm_ver("1.7.3")),
        Err(AdapterError::UnsupportedManufacturer(_))
    ));
}

#[test]
fn test_new_type_is_visible_after_write() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut adapter = adapter(dir.path());
    adapter.create_type(&device_type("1.2.0", 0)).unwrap();

    // 1.4.0 is newer than anything stored for major 1.
    assert!(adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.4.0"))
        .is_err());

    adapter.create_type(&device_type("1.4.0", 60)).unwrap();
    let collection = adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.4.0"))
        .unwrap();
    assert_eq!(
        collection.get_object(&CLOCK).unwrap().get_attr(3).unwrap(),
        Some(&Data::Long(60))
    );
}

#[test]
fn test_keep_and_get_data() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut adapter = adapter(dir.path());
    adapter.create_type(&device_type("1.7.3", 60)).unwrap();

    let mut device = adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.7.3"))
        .unwrap();
    device.set_ldn(b"KPZ00000042").unwrap();

    // Nothing differs from the type yet.
    assert!(!adapter.keep_data(&device, DEFAULT_ASSOCIATION).unwrap());
    assert!(!dir.path().join("XML_devices").exists());

    let clock = device.get_object_mut(&CLOCK).unwrap();
    clock.set_value(8, Data::Boolean(true)).unwrap();
    // Dynamic values are never kept.
    clock.set_value(2, Data::OctetString(vec![0x07, 0xea])).unwrap();
    device
        .get_object_mut(&SERIAL)
        .unwrap()
        .set_value(2, Data::OctetString(b"SN-42".to_vec()))
        .unwrap();
    assert!(adapter.keep_data(&device, DEFAULT_ASSOCIATION).unwrap());

    let path = dir.path().join("XML_devices/4b505a3030303030303432.xml");
    let xml = fs::read_to_string(&path).unwrap();
    assert!(xml.contains("<DLMSServerData version=\"5.0\">"));
    assert!(xml.contains("<attr index=\"8\">0301</attr>"));
    assert!(!xml.contains("<attr index=\"2\">0902"));

    let mut fresh = adapter
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.7.3"))
        .unwrap();
    fresh.set_ldn(b"KPZ00000042").unwrap();
    let report = adapter.get_data(&mut fresh).unwrap();
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.applied, 2);
    assert_eq!(
        fresh.get_object(&CLOCK).unwrap().get_attr(8).unwrap(),
        Some(&Data::Boolean(true))
    );
    assert_eq!(
        fresh.get_object(&SERIAL).unwrap().get_attr(2).unwrap(),
        Some(&Data::OctetString(b"SN-42".to_vec()))
    );
}

#[test]
fn test_keep_data_without_the_association() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let mut adapter = adapter(dir.path());
    adapter.create_type(&device_type("1.7.3", 60)).unwrap();

    let mut device = device_type("1.7.3", 60);
    device.set_ldn(b"KPZ00000042").unwrap();
    assert!(matches!(
        adapter.keep_data(&device, 1),
        Err(AdapterError::Model(_))
    ));
}

#[test]
fn test_pool_routes_to_the_xml_adapter() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let config = AdapterConfig::from_toml_str(&format!(
        "root = {:?}\n[pool]\nget_collection = [\"missing\", \"xml50\"]\n",
        dir.path().display().to_string()
    ))
    .unwrap();
    let adapters: Vec<Box<dyn Adapter>> = vec![Box::new(XmlAdapter::from_config(&config))];
    let mut pool = AdapterPool::new(adapters, &config.pool);

    pool.create_type(&device_type("1.4.0", 60)).unwrap();
    let collection = pool
        .get_collection(MANUFACTURER, &firm_id(), &firm_ver("1.4.0"))
        .unwrap();
    assert!(collection.is_in_collection(&CLOCK));
    assert_eq!(pool.collection_identifiers().unwrap().len(), 1);
}
