// src/parser.rs

use crate::error::AdapterError;
use crate::model::ParameterNode;
use cosem_rs::ParameterValue;
use std::fs;
use std::path::Path;

/// Reads a document from disk.
///
/// Bytes that are not valid UTF-8 are replaced, so legacy files saved in a
/// single-byte code page still parse; their identity and values are hex or
/// ASCII.
pub fn read_document(path: &Path) -> Result<String, AdapterError> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parses a "0x..." or "..." hex string into a Vec<u8>. Surrounding
/// whitespace is ignored.
pub fn parse_hex_string(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if trimmed.len() % 2 != 0 {
        return Err(hex::FromHexError::OddLength);
    }
    hex::decode(trimmed)
}

/// Parses a `<par>`/`<value>` node into a `ParameterValue`.
pub fn parse_parameter(node: &ParameterNode) -> Result<ParameterValue, AdapterError> {
    let par = parse_hex_string(&node.par)?;
    let par = ParameterValue::parse_par(&par)
        .map_err(|_| AdapterError::MalformedDocument(format!("parameter address {:?}", node.par)))?;
    Ok(ParameterValue::new(par, parse_hex_string(&node.value)?))
}

pub fn parameter_node(value: &ParameterValue) -> ParameterNode {
    ParameterNode {
        par: hex::encode(value.par),
        value: hex::encode(&value.value),
    }
}
