// crates/cosem-rs/src/data.rs

use crate::error::CosemError;
use core::fmt;

/// Deepest nesting of arrays and structures accepted when decoding.
pub const MAX_NESTING: usize = 64;

/// A-XDR data tags as they appear as the first byte of an encoded value.
pub mod tag {
    pub const NULL_DATA: u8 = 0;
    pub const ARRAY: u8 = 1;
    pub const STRUCTURE: u8 = 2;
    pub const BOOLEAN: u8 = 3;
    pub const BIT_STRING: u8 = 4;
    pub const DOUBLE_LONG: u8 = 5;
    pub const DOUBLE_LONG_UNSIGNED: u8 = 6;
    pub const OCTET_STRING: u8 = 9;
    pub const VISIBLE_STRING: u8 = 10;
    pub const UTF8_STRING: u8 = 12;
    pub const BCD: u8 = 13;
    pub const INTEGER: u8 = 15;
    pub const LONG: u8 = 16;
    pub const UNSIGNED: u8 = 17;
    pub const LONG_UNSIGNED: u8 = 18;
    pub const LONG64: u8 = 20;
    pub const LONG64_UNSIGNED: u8 = 21;
    pub const ENUM: u8 = 22;
    pub const FLOAT32: u8 = 23;
    pub const FLOAT64: u8 = 24;
    pub const DATE_TIME: u8 = 25;
    pub const DATE: u8 = 26;
    pub const TIME: u8 = 27;
}

/// A decoded COSEM attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Null,
    Array(Vec<Data>),
    Structure(Vec<Data>),
    Boolean(bool),
    /// Bit count followed by the packed bits, most significant bit first.
    BitString { bits: usize, bytes: Vec<u8> },
    DoubleLong(i32),
    DoubleLongUnsigned(u32),
    OctetString(Vec<u8>),
    VisibleString(Vec<u8>),
    Utf8String(Vec<u8>),
    Bcd(i8),
    Integer(i8),
    Long(i16),
    Unsigned(u8),
    LongUnsigned(u16),
    Long64(i64),
    Long64Unsigned(u64),
    Enum(u8),
    Float32(f32),
    Float64(f64),
    DateTime([u8; 12]),
    Date([u8; 5]),
    Time([u8; 4]),
}

impl Data {
    pub fn tag(&self) -> u8 {
        match self {
            Data::Null => tag::NULL_DATA,
            Data::Array(_) => tag::ARRAY,
            Data::Structure(_) => tag::STRUCTURE,
            Data::Boolean(_) => tag::BOOLEAN,
            Data::BitString { .. } => tag::BIT_STRING,
            Data::DoubleLong(_) => tag::DOUBLE_LONG,
            Data::DoubleLongUnsigned(_) => tag::DOUBLE_LONG_UNSIGNED,
            Data::OctetString(_) => tag::OCTET_STRING,
            Data::VisibleString(_) => tag::VISIBLE_STRING,
            Data::Utf8String(_) => tag::UTF8_STRING,
            Data::Bcd(_) => tag::BCD,
            Data::Integer(_) => tag::INTEGER,
            Data::Long(_) => tag::LONG,
            Data::Unsigned(_) => tag::UNSIGNED,
            Data::LongUnsigned(_) => tag::LONG_UNSIGNED,
            Data::Long64(_) => tag::LONG64,
            Data::Long64Unsigned(_) => tag::LONG64_UNSIGNED,
            Data::Enum(_) => tag::ENUM,
            Data::Float32(_) => tag::FLOAT32,
            Data::Float64(_) => tag::FLOAT64,
            Data::DateTime(_) => tag::DATE_TIME,
            Data::Date(_) => tag::DATE,
            Data::Time(_) => tag::TIME,
        }
    }

    /// The value a freshly selected CHOICE branch holds before it is read.
    pub fn default_for_tag(tag: u8) -> Result<Data, CosemError> {
        Ok(match tag {
            tag::NULL_DATA => Data::Null,
            tag::ARRAY => Data::Array(Vec::new()),
            tag::STRUCTURE => Data::Structure(Vec::new()),
            tag::BOOLEAN => Data::Boolean(false),
            tag::BIT_STRING => Data::BitString {
                bits: 0,
                bytes: Vec::new(),
            },
            tag::DOUBLE_LONG => Data::DoubleLong(0),
            tag::DOUBLE_LONG_UNSIGNED => Data::DoubleLongUnsigned(0),
            tag::OCTET_STRING => Data::OctetString(Vec::new()),
            tag::VISIBLE_STRING => Data::VisibleString(Vec::new()),
            tag::UTF8_STRING => Data::Utf8String(Vec::new()),
            tag::BCD => Data::Bcd(0),
            tag::INTEGER => Data::Integer(0),
            tag::LONG => Data::Long(0),
            tag::UNSIGNED => Data::Unsigned(0),
            tag::LONG_UNSIGNED => Data::LongUnsigned(0),
            tag::LONG64 => Data::Long64(0),
            tag::LONG64_UNSIGNED => Data::Long64Unsigned(0),
            tag::ENUM => Data::Enum(0),
            tag::FLOAT32 => Data::Float32(0.0),
            tag::FLOAT64 => Data::Float64(0.0),
            // Date and time fields default to "not specified".
            tag::DATE_TIME => Data::DateTime([
                0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x80, 0x00, 0xff,
            ]),
            tag::DATE => Data::Date([0xff; 5]),
            tag::TIME => Data::Time([0xff; 4]),
            other => return Err(CosemError::UnknownTag(other)),
        })
    }

    /// Serializes the value into its A-XDR encoding, tag included.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf);
        buf
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag());
        match self {
            Data::Null => {}
            Data::Array(items) | Data::Structure(items) => {
                encode_length(items.len(), buf);
                for item in items {
                    item.encode_into(buf);
                }
            }
            Data::Boolean(v) => buf.push(u8::from(*v)),
            Data::BitString { bits, bytes } => {
                encode_length(*bits, buf);
                buf.extend_from_slice(bytes);
            }
            Data::DoubleLong(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::DoubleLongUnsigned(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::OctetString(v) | Data::VisibleString(v) | Data::Utf8String(v) => {
                encode_length(v.len(), buf);
                buf.extend_from_slice(v);
            }
            Data::Bcd(v) | Data::Integer(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::Unsigned(v) | Data::Enum(v) => buf.push(*v),
            Data::LongUnsigned(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::Long64(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::Long64Unsigned(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::Float32(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::Float64(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Data::DateTime(v) => buf.extend_from_slice(v),
            Data::Date(v) => buf.extend_from_slice(v),
            Data::Time(v) => buf.extend_from_slice(v),
        }
    }

    /// Decodes exactly one value. Trailing bytes are an error.
    pub fn decode(input: &[u8]) -> Result<Data, CosemError> {
        let (data, rest) = Self::parse(input)?;
        if !rest.is_empty() {
            return Err(CosemError::TrailingBytes(rest.len()));
        }
        Ok(data)
    }

    /// Decodes one value from the front of `input` and returns the remainder.
    ///
    /// Arrays and structures nested deeper than [`MAX_NESTING`] are refused.
    pub fn parse(input: &[u8]) -> Result<(Data, &[u8]), CosemError> {
        Self::parse_nested(input, 0)
    }

    fn parse_nested(input: &[u8], depth: usize) -> Result<(Data, &[u8]), CosemError> {
        let (&tag, rest) = input
            .split_first()
            .ok_or(CosemError::BufferTooShort { needed: 1 })?;

        macro_rules! parse_fixed {
            ($rest:expr, $variant:path, $type:ty) => {{
                let (bytes, rest) = take_array::<{ core::mem::size_of::<$type>() }>($rest)?;
                Ok(($variant(<$type>::from_be_bytes(bytes)), rest))
            }};
        }

        match tag {
            tag::NULL_DATA => Ok((Data::Null, rest)),
            tag::ARRAY | tag::STRUCTURE => {
                if depth >= MAX_NESTING {
                    return Err(CosemError::NestingTooDeep(MAX_NESTING));
                }
                let (count, mut rest) = parse_length(rest)?;
                let mut items = Vec::with_capacity(count.min(rest.len()));
                for _ in 0..count {
                    let (item, remaining) = Self::parse_nested(rest, depth + 1)?;
                    items.push(item);
                    rest = remaining;
                }
                let data = if tag == tag::ARRAY {
                    Data::Array(items)
                } else {
                    Data::Structure(items)
                };
                Ok((data, rest))
            }
            tag::BOOLEAN => {
                let ([value], rest) = take_array::<1>(rest)?;
                Ok((Data::Boolean(value != 0), rest))
            }
            tag::BIT_STRING => {
                let (bits, rest) = parse_length(rest)?;
                let (bytes, rest) = take(rest, bits.div_ceil(8))?;
                Ok((
                    Data::BitString {
                        bits,
                        bytes: bytes.to_vec(),
                    },
                    rest,
                ))
            }
            tag::DOUBLE_LONG => parse_fixed!(rest, Data::DoubleLong, i32),
            tag::DOUBLE_LONG_UNSIGNED => parse_fixed!(rest, Data::DoubleLongUnsigned, u32),
            tag::OCTET_STRING | tag::VISIBLE_STRING | tag::UTF8_STRING => {
                let (len, rest) = parse_length(rest)?;
                let (bytes, rest) = take(rest, len)?;
                let bytes = bytes.to_vec();
                let data = match tag {
                    tag::OCTET_STRING => Data::OctetString(bytes),
                    tag::VISIBLE_STRING => Data::VisibleString(bytes),
                    _ => Data::Utf8String(bytes),
                };
                Ok((data, rest))
            }
            tag::BCD => parse_fixed!(rest, Data::Bcd, i8),
            tag::INTEGER => parse_fixed!(rest, Data::Integer, i8),
            tag::LONG => parse_fixed!(rest, Data::Long, i16),
            tag::UNSIGNED => parse_fixed!(rest, Data::Unsigned, u8),
            tag::LONG_UNSIGNED => parse_fixed!(rest, Data::LongUnsigned, u16),
            tag::LONG64 => parse_fixed!(rest, Data::Long64, i64),
            tag::LONG64_UNSIGNED => parse_fixed!(rest, Data::Long64Unsigned, u64),
            tag::ENUM => parse_fixed!(rest, Data::Enum, u8),
            tag::FLOAT32 => parse_fixed!(rest, Data::Float32, f32),
            tag::FLOAT64 => parse_fixed!(rest, Data::Float64, f64),
            tag::DATE_TIME => {
                let (bytes, rest) = take_array::<12>(rest)?;
                Ok((Data::DateTime(bytes), rest))
            }
            tag::DATE => {
                let (bytes, rest) = take_array::<5>(rest)?;
                Ok((Data::Date(bytes), rest))
            }
            tag::TIME => {
                let (bytes, rest) = take_array::<4>(rest)?;
                Ok((Data::Time(bytes), rest))
            }
            other => Err(CosemError::UnknownTag(other)),
        }
    }

    /// Bytes of the string variants.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::OctetString(v) | Data::VisibleString(v) | Data::Utf8String(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric value of the non-negative integer variants.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Data::Unsigned(v) | Data::Enum(v) => Some(v.into()),
            Data::LongUnsigned(v) => Some(v.into()),
            Data::DoubleLongUnsigned(v) => Some(v.into()),
            Data::Long64Unsigned(v) => Some(v),
            Data::Integer(v) => u64::try_from(v).ok(),
            Data::Long(v) => u64::try_from(v).ok(),
            Data::DoubleLong(v) => u64::try_from(v).ok(),
            Data::Long64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }
}

fn encode_length(len: usize, buf: &mut Vec<u8>) {
    if len < 0x80 {
        buf.push(len as u8);
    } else {
        let bytes = (len as u32).to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        buf.push(0x80 | (bytes.len() - skip) as u8);
        buf.extend_from_slice(&bytes[skip..]);
    }
}

fn parse_length(input: &[u8]) -> Result<(usize, &[u8]), CosemError> {
    let ([first], rest) = take_array::<1>(input)?;
    if first < 0x80 {
        return Ok((first.into(), rest));
    }
    let count = usize::from(first & 0x7f);
    if count == 0 || count > 4 {
        return Err(CosemError::InvalidLength);
    }
    let (bytes, rest) = take(rest, count)?;
    let len = bytes
        .iter()
        .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte));
    Ok((len, rest))
}

fn take(input: &[u8], len: usize) -> Result<(&[u8], &[u8]), CosemError> {
    if input.len() < len {
        return Err(CosemError::BufferTooShort {
            needed: len - input.len(),
        });
    }
    Ok(input.split_at(len))
}

fn take_array<const N: usize>(input: &[u8]) -> Result<([u8; N], &[u8]), CosemError> {
    let (bytes, rest) = take(input, N)?;
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    Ok((array, rest))
}

/// The declared data type of an attribute in an interface class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// A single fixed A-XDR type.
    Simple(u8),
    Array,
    Structure,
    /// Any A-XDR type; the device decides which one it reports.
    Choice,
    /// The capture-object list of a profile.
    CaptureObjects,
}

impl DataType {
    pub fn is_choice(&self) -> bool {
        matches!(self, DataType::Choice)
    }

    /// The tag every value of this type carries. `None` for CHOICE.
    pub fn tag(&self) -> Option<u8> {
        match *self {
            DataType::Simple(tag) => Some(tag),
            DataType::Array | DataType::CaptureObjects => Some(tag::ARRAY),
            DataType::Structure => Some(tag::STRUCTURE),
            DataType::Choice => None,
        }
    }

    pub fn accepts(&self, data: &Data) -> bool {
        match self.tag() {
            Some(tag) => data.tag() == tag,
            None => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Simple(tag) => write!(f, "tag {tag}"),
            DataType::Array => f.write_str("array"),
            DataType::Structure => f.write_str("structure"),
            DataType::Choice => f.write_str("choice"),
            DataType::CaptureObjects => f.write_str("capture objects"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_encodings() {
        assert_eq!(Data::Boolean(true).encode(), vec![0x03, 0x01]);
        assert_eq!(Data::Long(-60).encode(), vec![0x10, 0xff, 0xc4]);
        assert_eq!(Data::LongUnsigned(0x1234).encode(), vec![0x12, 0x12, 0x34]);
        assert_eq!(
            Data::DoubleLongUnsigned(12345).encode(),
            vec![0x06, 0x00, 0x00, 0x30, 0x39]
        );
        assert_eq!(Data::Enum(1).encode(), vec![0x16, 0x01]);
        assert_eq!(
            Data::OctetString(b"abc".to_vec()).encode(),
            vec![0x09, 0x03, b'a', b'b', b'c']
        );
    }

    #[test]
    fn test_nested_value_roundtrip() {
        let original = Data::Array(vec![Data::Structure(vec![
            Data::LongUnsigned(8),
            Data::Unsigned(0),
            Data::OctetString(vec![0, 0, 1, 0, 0, 255]),
            Data::Null,
            Data::Float32(1.5),
        ])]);
        let bytes = original.encode();
        assert_eq!(Data::decode(&bytes), Ok(original));
    }

    #[test]
    fn test_long_length_form() {
        let original = Data::OctetString(vec![0xaa; 300]);
        let bytes = original.encode();
        assert_eq!(&bytes[..4], &[0x09, 0x82, 0x01, 0x2c]);
        assert_eq!(Data::decode(&bytes), Ok(original));
    }

    #[test]
    fn test_boolean_accepts_any_nonzero_byte() {
        assert_eq!(Data::decode(&[0x03, 0x04]), Ok(Data::Boolean(true)));
        assert_eq!(Data::decode(&[0x03, 0x00]), Ok(Data::Boolean(false)));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(Data::decode(&[]), Err(CosemError::BufferTooShort { needed: 1 }));
        assert_eq!(Data::decode(&[0x07]), Err(CosemError::UnknownTag(7)));
        assert_eq!(
            Data::decode(&[0x12, 0x00]),
            Err(CosemError::BufferTooShort { needed: 1 })
        );
        assert_eq!(
            Data::decode(&[0x11, 0x01, 0x02]),
            Err(CosemError::TrailingBytes(1))
        );
        assert_eq!(Data::decode(&[0x09, 0x80]), Err(CosemError::InvalidLength));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |levels: usize| {
            let mut bytes = [0x01, 0x01].repeat(levels);
            bytes.push(0x00);
            bytes
        };
        assert!(Data::decode(&nested(MAX_NESTING)).is_ok());
        assert_eq!(
            Data::decode(&nested(MAX_NESTING + 1)),
            Err(CosemError::NestingTooDeep(MAX_NESTING))
        );
        // Deep garbage fails instead of exhausting the stack.
        assert_eq!(
            Data::decode(&nested(200_000)),
            Err(CosemError::NestingTooDeep(MAX_NESTING))
        );
    }

    #[test]
    fn test_default_for_tag_matches_tag() {
        let tags = [
            0u8, 1, 2, 3, 4, 5, 6, 9, 10, 12, 13, 15, 16, 17, 18, 20, 21, 22, 23, 24, 25, 26, 27,
        ];
        for tag in tags {
            assert_eq!(Data::default_for_tag(tag).unwrap().tag(), tag);
        }
        assert_eq!(Data::default_for_tag(8), Err(CosemError::UnknownTag(8)));
    }

    #[test]
    fn test_data_type_accepts() {
        assert!(DataType::Choice.accepts(&Data::Null));
        assert!(DataType::CaptureObjects.accepts(&Data::Array(vec![])));
        assert!(DataType::Simple(tag::LONG).accepts(&Data::Long(3)));
        assert!(!DataType::Simple(tag::LONG).accepts(&Data::Unsigned(3)));
        assert!(!DataType::Structure.accepts(&Data::Array(vec![])));
    }
}
