// crates/cosem-rs/src/classes.rs

//! Attribute tables of the supported COSEM interface classes.

use crate::data::{DataType, tag};
use crate::error::CosemError;
use crate::object::Classifier::{Dynamic, Static};
use crate::object::{AttributeElement, Classifier};

pub const DATA: u16 = 1;
pub const REGISTER: u16 = 3;
pub const EXTENDED_REGISTER: u16 = 4;
pub const PROFILE_GENERIC: u16 = 7;
pub const CLOCK: u16 = 8;
pub const ASSOCIATION_LN: u16 = 15;
pub const ACTIVITY_CALENDAR: u16 = 20;
pub const DISCONNECT_CONTROL: u16 = 70;

const fn attr(name: &'static str, data_type: DataType, classifier: Classifier) -> AttributeElement {
    AttributeElement {
        name,
        data_type,
        classifier,
    }
}

const fn simple(tag: u8) -> DataType {
    DataType::Simple(tag)
}

const LOGICAL_NAME: AttributeElement = attr("logical_name", simple(tag::OCTET_STRING), Static);

static DATA_V0: [AttributeElement; 2] = [LOGICAL_NAME, attr("value", DataType::Choice, Static)];

static REGISTER_V0: [AttributeElement; 3] = [
    LOGICAL_NAME,
    attr("value", DataType::Choice, Dynamic),
    attr("scaler_unit", DataType::Structure, Static),
];

static EXTENDED_REGISTER_V0: [AttributeElement; 5] = [
    LOGICAL_NAME,
    attr("value", DataType::Choice, Dynamic),
    attr("scaler_unit", DataType::Structure, Static),
    attr("status", DataType::Choice, Dynamic),
    attr("capture_time", simple(tag::OCTET_STRING), Dynamic),
];

static PROFILE_GENERIC_V1: [AttributeElement; 8] = [
    LOGICAL_NAME,
    attr("buffer", DataType::Array, Dynamic),
    attr("capture_objects", DataType::CaptureObjects, Static),
    attr("capture_period", simple(tag::DOUBLE_LONG_UNSIGNED), Static),
    attr("sort_method", simple(tag::ENUM), Static),
    attr("sort_object", DataType::Structure, Static),
    attr("entries_in_use", simple(tag::DOUBLE_LONG_UNSIGNED), Dynamic),
    attr("profile_entries", simple(tag::DOUBLE_LONG_UNSIGNED), Static),
];

static CLOCK_V0: [AttributeElement; 9] = [
    LOGICAL_NAME,
    attr("time", simple(tag::OCTET_STRING), Dynamic),
    attr("time_zone", simple(tag::LONG), Static),
    attr("status", simple(tag::UNSIGNED), Dynamic),
    attr("daylight_savings_begin", simple(tag::OCTET_STRING), Static),
    attr("daylight_savings_end", simple(tag::OCTET_STRING), Static),
    attr("daylight_savings_deviation", simple(tag::INTEGER), Static),
    attr("daylight_savings_enabled", simple(tag::BOOLEAN), Static),
    attr("clock_base", simple(tag::ENUM), Static),
];

// Version 0 ends at association_status, version 1 adds the security setup
// reference, versions 2 and 3 add the user list.
static ASSOCIATION_LN_V3: [AttributeElement; 11] = [
    LOGICAL_NAME,
    attr("object_list", DataType::Array, Static),
    attr("associated_partners_id", DataType::Structure, Static),
    attr("application_context_name", DataType::Choice, Static),
    attr("xdlms_context_info", DataType::Structure, Static),
    attr("authentication_mechanism_name", DataType::Choice, Static),
    attr("secret", simple(tag::OCTET_STRING), Static),
    attr("association_status", simple(tag::ENUM), Dynamic),
    attr("security_setup_reference", simple(tag::OCTET_STRING), Static),
    attr("user_list", DataType::Array, Static),
    attr("current_user", DataType::Structure, Dynamic),
];

static ACTIVITY_CALENDAR_V0: [AttributeElement; 10] = [
    LOGICAL_NAME,
    attr("calendar_name_active", simple(tag::OCTET_STRING), Static),
    attr("season_profile_active", DataType::Array, Static),
    attr("week_profile_table_active", DataType::Array, Static),
    attr("day_profile_table_active", DataType::Array, Static),
    attr("calendar_name_passive", simple(tag::OCTET_STRING), Static),
    attr("season_profile_passive", DataType::Array, Static),
    attr("week_profile_table_passive", DataType::Array, Static),
    attr("day_profile_table_passive", DataType::Array, Static),
    attr("activate_passive_calendar_time", simple(tag::OCTET_STRING), Static),
];

static DISCONNECT_CONTROL_V0: [AttributeElement; 4] = [
    LOGICAL_NAME,
    attr("output_state", simple(tag::BOOLEAN), Dynamic),
    attr("control_state", simple(tag::ENUM), Dynamic),
    attr("control_mode", simple(tag::ENUM), Static),
];

/// Attribute table of `class_id` at `version`, attribute 1 first.
pub fn attributes(class_id: u16, version: u8) -> Result<&'static [AttributeElement], CosemError> {
    match (class_id, version) {
        (DATA, 0) => Ok(&DATA_V0),
        (REGISTER, 0) => Ok(&REGISTER_V0),
        (EXTENDED_REGISTER, 0) => Ok(&EXTENDED_REGISTER_V0),
        (PROFILE_GENERIC, 0 | 1) => Ok(&PROFILE_GENERIC_V1),
        (CLOCK, 0) => Ok(&CLOCK_V0),
        (ASSOCIATION_LN, 0) => Ok(&ASSOCIATION_LN_V3[..8]),
        (ASSOCIATION_LN, 1) => Ok(&ASSOCIATION_LN_V3[..9]),
        (ASSOCIATION_LN, 2 | 3) => Ok(&ASSOCIATION_LN_V3),
        (ACTIVITY_CALENDAR, 0) => Ok(&ACTIVITY_CALENDAR_V0),
        (DISCONNECT_CONTROL, 0) => Ok(&DISCONNECT_CONTROL_V0),
        _ => Err(CosemError::UnsupportedClass { class_id, version }),
    }
}

pub fn class_name(class_id: u16) -> &'static str {
    match class_id {
        DATA => "Data",
        REGISTER => "Register",
        EXTENDED_REGISTER => "Extended register",
        PROFILE_GENERIC => "Profile generic",
        CLOCK => "Clock",
        ASSOCIATION_LN => "Association LN",
        ACTIVITY_CALENDAR => "Activity calendar",
        DISCONNECT_CONTROL => "Disconnect control",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_versions_grow() {
        assert_eq!(attributes(ASSOCIATION_LN, 0).unwrap().len(), 8);
        assert_eq!(attributes(ASSOCIATION_LN, 1).unwrap().len(), 9);
        assert_eq!(attributes(ASSOCIATION_LN, 3).unwrap().len(), 11);
    }

    #[test]
    fn test_every_class_starts_with_logical_name() {
        let classes = [(1, 0), (3, 0), (4, 0), (7, 1), (8, 0), (15, 2), (20, 0), (70, 0)];
        for (class_id, version) in classes {
            let table = attributes(class_id, version).unwrap();
            assert_eq!(table[0].name, "logical_name", "class {class_id}");
        }
    }

    #[test]
    fn test_unknown_class() {
        assert_eq!(
            attributes(9, 0),
            Err(CosemError::UnsupportedClass {
                class_id: 9,
                version: 0
            })
        );
        assert_eq!(class_name(9), "Unknown");
    }
}
