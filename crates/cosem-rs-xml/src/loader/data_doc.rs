//! Applies the value nodes of a data document to a collection.

use super::PendingAttribute;
use crate::model::legacy::LegacyObject;
use crate::model::server::DataObject;
use crate::parser::parse_hex_string;
use crate::report::{AttributeDecodeError, DecodeReport};
use cosem_rs::{Collection, LogicalName};
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataEntry {
    pub ln: String,
    pub attributes: Vec<PendingAttribute>,
}

impl From<&DataObject> for DataEntry {
    fn from(node: &DataObject) -> Self {
        Self {
            ln: node.ln.clone(),
            attributes: node.attributes.iter().map(PendingAttribute::from).collect(),
        }
    }
}

impl From<&LegacyObject> for DataEntry {
    fn from(node: &LegacyObject) -> Self {
        Self {
            ln: node.ln.clone(),
            attributes: node.values().map(PendingAttribute::from).collect(),
        }
    }
}

/// Sets every listed attribute of objects already in `collection`.
///
/// Objects unknown to the collection are skipped whole; a value that does
/// not decode leaves its attribute unchanged.
pub(crate) fn fill_data(entries: &[DataEntry], collection: &mut Collection) -> DecodeReport {
    let mut report = DecodeReport::default();
    for entry in entries {
        let Ok(logical_name) = entry.ln.parse::<LogicalName>() else {
            report.skip(&entry.ln, None, AttributeDecodeError::InvalidLogicalName);
            continue;
        };
        if !collection.is_in_collection(&logical_name) {
            report.abandoned += entry.attributes.len();
            report.skip(&entry.ln, None, AttributeDecodeError::ObjectNotFound);
            continue;
        }
        for attr in &entry.attributes {
            match apply_value(collection, &logical_name, attr) {
                Ok(()) => report.applied += 1,
                Err(e) => report.skip(&entry.ln, Some(&attr.index), e),
            }
        }
    }
    info!("Data decoded: {} values applied, {} skipped", report.applied, report.skipped.len());
    report
}

fn apply_value(
    collection: &mut Collection,
    logical_name: &LogicalName,
    attr: &PendingAttribute,
) -> Result<(), AttributeDecodeError> {
    let index: u8 = attr
        .index
        .trim()
        .parse()
        .map_err(|_| AttributeDecodeError::InvalidIndex(attr.index.clone()))?;
    let bytes = parse_hex_string(&attr.value)
        .map_err(|_| AttributeDecodeError::MalformedHex(attr.value.trim().to_string()))?;
    collection.get_object_mut(logical_name)?.set_attr(index, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosem_rs::{Data, classes};

    const CLOCK: LogicalName = LogicalName::new(0, 0, 1, 0, 0, 255);

    fn entry(ln: &str, attributes: &[(&str, &str)]) -> DataEntry {
        DataEntry {
            ln: ln.to_string(),
            attributes: attributes
                .iter()
                .map(|(index, value)| PendingAttribute {
                    index: index.to_string(),
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_bad_attributes_do_not_stop_the_rest() {
        let mut collection = Collection::new();
        collection.add_if_missing(classes::CLOCK, 0, CLOCK).unwrap();

        let entries = vec![
            entry("0000010000ff", &[("8", "0300"), ("9", "zz"), ("3", "1600"), ("7", "0f3c")]),
            entry("1.0.1.8.0.255", &[("2", "0600000001")]),
        ];
        let report = fill_data(&entries, &mut collection);

        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(report.abandoned, 1);
        assert_eq!(
            report.skipped[0].error,
            AttributeDecodeError::MalformedHex("zz".to_string())
        );
        let clock = collection.get_object(&CLOCK).unwrap();
        assert_eq!(clock.get_attr(8).unwrap(), Some(&Data::Boolean(false)));
        assert_eq!(clock.get_attr(7).unwrap(), Some(&Data::Integer(60)));
        assert_eq!(clock.get_attr(3).unwrap(), None);
    }
}
