// crates/cosem-rs/src/association.rs

use crate::data::Data;
use crate::error::CosemError;
use crate::types::LogicalName;

/// Attribute access mode as reported in an association object list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMode(pub u8);

impl AccessMode {
    pub const NO_ACCESS: AccessMode = AccessMode(0);
    pub const READ_ONLY: AccessMode = AccessMode(1);
    pub const WRITE_ONLY: AccessMode = AccessMode(2);
    pub const READ_AND_WRITE: AccessMode = AccessMode(3);
    pub const AUTHENTICATED_READ_ONLY: AccessMode = AccessMode(4);
    pub const AUTHENTICATED_WRITE_ONLY: AccessMode = AccessMode(5);
    pub const AUTHENTICATED_READ_AND_WRITE: AccessMode = AccessMode(6);

    pub fn is_readable(&self) -> bool {
        matches!(self.0, 1 | 3 | 4 | 6)
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.0, 2 | 3 | 5 | 6)
    }
}

/// One `attribute_access` item of an object list element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeAccess {
    pub attribute_id: u8,
    pub access_mode: AccessMode,
}

/// An entry of `object_list`: which object the association exposes and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectListElement {
    pub class_id: u16,
    pub version: u8,
    pub logical_name: LogicalName,
    pub attribute_access: Vec<AttributeAccess>,
}

impl ObjectListElement {
    pub fn new(
        class_id: u16,
        version: u8,
        logical_name: LogicalName,
        access: &[(u8, AccessMode)],
    ) -> Self {
        Self {
            class_id,
            version,
            logical_name,
            attribute_access: access
                .iter()
                .map(|&(attribute_id, access_mode)| AttributeAccess {
                    attribute_id,
                    access_mode,
                })
                .collect(),
        }
    }

    /// Reads `structure{class_id, version, logical_name, access_rights}`.
    pub fn from_data(data: &Data) -> Result<Self, CosemError> {
        let Data::Structure(fields) = data else {
            return Err(CosemError::MalformedObjectList("element is not a structure"));
        };
        let [class_id, version, logical_name, access_rights] = fields.as_slice() else {
            return Err(CosemError::MalformedObjectList("element must have 4 fields"));
        };
        let class_id = class_id
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or(CosemError::MalformedObjectList("class_id"))?;
        let version = version
            .as_u64()
            .and_then(|v| u8::try_from(v).ok())
            .ok_or(CosemError::MalformedObjectList("version"))?;
        let logical_name = logical_name
            .as_bytes()
            .ok_or(CosemError::MalformedObjectList("logical_name"))
            .and_then(LogicalName::from_slice)?;

        let attribute_access = match access_rights {
            Data::Structure(rights) => match rights.first() {
                Some(Data::Array(items)) => items
                    .iter()
                    .map(parse_attribute_access)
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(CosemError::MalformedObjectList("attribute_access")),
            },
            _ => return Err(CosemError::MalformedObjectList("access_rights")),
        };

        Ok(Self {
            class_id,
            version,
            logical_name,
            attribute_access,
        })
    }

    /// Builds the A-XDR structure. Method access is written empty.
    ///
    /// Attribute ids are encoded as `integer`; an id above 127 is an error.
    pub fn to_data(&self) -> Result<Data, CosemError> {
        let attribute_access = self
            .attribute_access
            .iter()
            .map(|access| {
                let id = i8::try_from(access.attribute_id)
                    .map_err(|_| CosemError::MalformedObjectList("attribute_id"))?;
                Ok(Data::Structure(vec![
                    Data::Integer(id),
                    Data::Enum(access.access_mode.0),
                    Data::Null,
                ]))
            })
            .collect::<Result<Vec<_>, CosemError>>()?;
        Ok(Data::Structure(vec![
            Data::LongUnsigned(self.class_id),
            Data::Unsigned(self.version),
            Data::OctetString(self.logical_name.0.to_vec()),
            Data::Structure(vec![Data::Array(attribute_access), Data::Array(Vec::new())]),
        ]))
    }
}

fn parse_attribute_access(item: &Data) -> Result<AttributeAccess, CosemError> {
    let Data::Structure(fields) = item else {
        return Err(CosemError::MalformedObjectList("attribute_access item"));
    };
    match fields.as_slice() {
        [Data::Integer(id), mode, ..] => Ok(AttributeAccess {
            attribute_id: u8::try_from(*id)
                .map_err(|_| CosemError::MalformedObjectList("attribute_id"))?,
            access_mode: AccessMode(
                mode.as_u64()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or(CosemError::MalformedObjectList("access_mode"))?,
            ),
        }),
        _ => Err(CosemError::MalformedObjectList("attribute_access item")),
    }
}

pub fn object_list_from_data(data: &Data) -> Result<Vec<ObjectListElement>, CosemError> {
    match data {
        Data::Array(items) => items.iter().map(ObjectListElement::from_data).collect(),
        _ => Err(CosemError::MalformedObjectList("object_list is not an array")),
    }
}

pub fn object_list_to_data(elements: &[ObjectListElement]) -> Result<Data, CosemError> {
    elements
        .iter()
        .map(ObjectListElement::to_data)
        .collect::<Result<Vec<_>, _>>()
        .map(Data::Array)
}
