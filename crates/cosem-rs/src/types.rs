// crates/cosem-rs/src/types.rs

use crate::data::Data;
use crate::error::CosemError;
use core::fmt;
use core::str::FromStr;

/// A 6-byte OBIS logical name identifying a COSEM object (A.B.C.D.E.F).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalName(pub [u8; 6]);

impl LogicalName {
    /// Logical device name object (0.0.42.0.0.255).
    pub const LDN: LogicalName = LogicalName([0, 0, 42, 0, 0, 255]);
    /// The association the client is currently connected through (0.0.40.0.0.255).
    pub const CURRENT_ASSOCIATION: LogicalName = LogicalName([0, 0, 40, 0, 0, 255]);

    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self([a, b, c, d, e, f])
    }

    /// Logical name of the Association LN object with the given instance id.
    pub const fn association(id: u8) -> Self {
        Self([0, 0, 40, 0, id, 255])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CosemError> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| CosemError::InvalidLogicalName(hex::encode(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Value group E. Zero for the current association.
    pub fn e(&self) -> u8 {
        self.0[4]
    }

    /// Lowercase 12-character hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a}.{b}.{c}.{d}.{e}.{g}")
    }
}

impl fmt::Debug for LogicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalName({self})")
    }
}

/// Accepts the dotted decimal form (`0.0.1.0.0.255`) and the 12-character
/// hex form (`0000010000ff`).
impl FromStr for LogicalName {
    type Err = CosemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || CosemError::InvalidLogicalName(text.to_string());
        if text.contains('.') {
            let groups = text
                .split('.')
                .map(|group| group.trim().parse::<u8>())
                .collect::<Result<Vec<u8>, _>>()
                .map_err(|_| invalid())?;
            Self::from_slice(&groups).map_err(|_| invalid())
        } else if text.len() == 12 {
            let bytes = hex::decode(text).map_err(|_| invalid())?;
            Self::from_slice(&bytes)
        } else {
            Err(invalid())
        }
    }
}

/// Address of the attribute holding the firmware (server type) identifier.
pub const FIRMWARE_ID_PAR: [u8; 7] = [0x00, 0x00, 0x60, 0x01, 0x01, 0xff, 0x02];
/// Address of the attribute holding the firmware version.
pub const FIRMWARE_VERSION_PAR: [u8; 7] = [0x00, 0x00, 0x00, 0x02, 0x01, 0xff, 0x02];
/// Address of the attribute holding the country specific version.
pub const COUNTRY_VERSION_PAR: [u8; 7] = [0x00, 0x00, 0x60, 0x01, 0x06, 0xff, 0x02];

/// An attribute address paired with the encoded value read from it.
///
/// The address is the logical name followed by the attribute index. The
/// value is the raw A-XDR encoding and is what identifies a type or a version.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterValue {
    pub par: [u8; 7],
    pub value: Vec<u8>,
}

impl ParameterValue {
    pub fn new(par: [u8; 7], value: Vec<u8>) -> Self {
        Self { par, value }
    }

    /// Wraps `text` as an octet-string value.
    pub fn from_text(par: [u8; 7], text: &str) -> Self {
        Self::new(par, Data::OctetString(text.as_bytes().to_vec()).encode())
    }

    pub fn parse_par(bytes: &[u8]) -> Result<[u8; 7], CosemError> {
        bytes
            .try_into()
            .map_err(|_| CosemError::InvalidLogicalName(hex::encode(bytes)))
    }

    /// The value as text when it encodes one of the string types.
    pub fn text(&self) -> Option<String> {
        match Data::decode(&self.value).ok()? {
            Data::OctetString(bytes) | Data::VisibleString(bytes) | Data::Utf8String(bytes) => {
                String::from_utf8(bytes).ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "{}:{text}", hex::encode(self.par)),
            None => write!(f, "{}:{}", hex::encode(self.par), hex::encode(&self.value)),
        }
    }
}

impl fmt::Debug for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterValue({self})")
    }
}
