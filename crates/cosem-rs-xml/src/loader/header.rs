//! Identity headers of the 5.0 and legacy documents.

use crate::error::AdapterError;
use crate::model::legacy::LegacyDocument;
use crate::model::server::ServerDocument;
use crate::parser::{parse_hex_string, parse_parameter};
use cosem_rs::types::{COUNTRY_VERSION_PAR, FIRMWARE_ID_PAR, FIRMWARE_VERSION_PAR};
use cosem_rs::{Collection, ParameterValue};

pub(crate) fn apply_server_header(
    document: &ServerDocument,
    collection: &mut Collection,
) -> Result<(), AdapterError> {
    if let Some(dlms_ver) = document.dlms_ver {
        collection.set_dlms_ver(dlms_ver);
    }
    if let Some(country) = document.country {
        collection.set_country(country);
    }
    if let Some(node) = &document.country_ver {
        collection.set_country_ver(parse_parameter(node)?);
    }
    if let Some(manufacturer) = &document.manufacturer {
        collection.set_manufacturer(parse_hex_string(manufacturer)?)?;
    }
    if let Some(node) = &document.firm_id {
        collection.set_firm_id(parse_parameter(node)?)?;
    }
    if let Some(node) = &document.firm_ver {
        collection.set_firm_ver(parse_parameter(node)?)?;
    }
    Ok(())
}

/// Maps the text header of 3.x/4.x documents onto parameter values:
/// `server_type` is the hex firmware id, `server_ver` and `country_ver` are
/// version strings stored as octet strings.
pub(crate) fn apply_legacy_header(
    document: &LegacyDocument,
    collection: &mut Collection,
) -> Result<(), AdapterError> {
    if let Some(dlms_ver) = document.dlms_ver {
        collection.set_dlms_ver(dlms_ver);
    }
    if let Some(country) = document.country {
        collection.set_country(country);
    }
    if let Some(country_ver) = &document.country_ver {
        collection.set_country_ver(ParameterValue::from_text(
            COUNTRY_VERSION_PAR,
            country_ver.trim(),
        ));
    }
    if let Some(manufacturer) = &document.manufacturer {
        collection.set_manufacturer(manufacturer.trim().as_bytes().to_vec())?;
    }
    if let Some(server_type) = &document.server_type {
        let firm_id = parse_hex_string(server_type)?;
        collection.set_firm_id(ParameterValue::new(FIRMWARE_ID_PAR, firm_id))?;
    }
    if let Some(server_ver) = &document.server_ver {
        let firm_ver = server_ver.value.trim();
        collection.set_firm_ver(ParameterValue::from_text(FIRMWARE_VERSION_PAR, firm_ver))?;
    }
    Ok(())
}
