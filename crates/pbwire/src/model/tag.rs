//! Field tags: the (field number, wire type) pair leading every field.

use std::fmt;

use crate::error::DecodeError;
use crate::limits::MAX_FIELD_NUMBER;

/// How the bytes following a tag are framed.
///
/// The closed set of supported codes is {0, 1, 2, 5}. The deprecated
/// group codes 3 and 4 are recognized but always rejected; 6 and 7 are
/// unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer (bool, int32/64, uint32/64).
    Varint = 0,
    /// 8 bytes, little-endian (double, raw 64-bit patterns).
    Fixed64 = 1,
    /// Varint length prefix followed by that many raw bytes
    /// (strings, bytes, nested messages, packed repeated scalars).
    LengthDelimited = 2,
    /// 4 bytes, little-endian (float, raw 32-bit patterns).
    Fixed32 = 5,
}

impl WireType {
    /// Creates a WireType from its 3-bit wire code.
    pub fn from_code(code: u8) -> Result<WireType, DecodeError> {
        match code {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            3 | 4 => Err(DecodeError::UnsupportedWireType { code }),
            _ => Err(DecodeError::UnknownWireType { code }),
        }
    }

    /// Returns the 3-bit wire code.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length-delimited",
            WireType::Fixed32 => "fixed32",
        };
        f.write_str(name)
    }
}

/// A field's wire identity: number plus framing.
///
/// Packed on the wire as the varint `(number << 3) | wire_type.code()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldTag {
    /// Field number, always in [1, 2^29 - 1].
    pub number: u32,
    pub wire_type: WireType,
}

impl FieldTag {
    /// Creates a tag, rejecting field numbers outside [1, 2^29 - 1].
    pub fn new(number: u32, wire_type: WireType) -> Option<FieldTag> {
        if number == 0 || number > MAX_FIELD_NUMBER {
            return None;
        }
        Some(FieldTag { number, wire_type })
    }

    /// Returns the packed varint payload for this tag.
    pub fn encoded(self) -> u64 {
        ((self.number as u64) << 3) | self.wire_type.code() as u64
    }

    /// Recovers the (number, wire type) pair from a packed tag varint.
    pub fn decompose(raw: u64) -> Result<FieldTag, DecodeError> {
        let wire_type = WireType::from_code((raw & 0x7) as u8)?;
        let number = raw >> 3;
        if number == 0 || number > MAX_FIELD_NUMBER as u64 {
            return Err(DecodeError::InvalidFieldNumber { number });
        }
        Ok(FieldTag {
            number: number as u32,
            wire_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_codes() {
        for (code, wt) in [
            (0u8, WireType::Varint),
            (1, WireType::Fixed64),
            (2, WireType::LengthDelimited),
            (5, WireType::Fixed32),
        ] {
            assert_eq!(WireType::from_code(code).unwrap(), wt);
            assert_eq!(wt.code(), code);
        }
    }

    #[test]
    fn test_group_codes_rejected() {
        assert!(matches!(
            WireType::from_code(3),
            Err(DecodeError::UnsupportedWireType { code: 3 })
        ));
        assert!(matches!(
            WireType::from_code(4),
            Err(DecodeError::UnsupportedWireType { code: 4 })
        ));
    }

    #[test]
    fn test_unknown_codes_rejected() {
        for code in [6u8, 7] {
            assert!(matches!(
                WireType::from_code(code),
                Err(DecodeError::UnknownWireType { .. })
            ));
        }
    }

    #[test]
    fn test_tag_roundtrip() {
        let numbers = [1u32, 2, 15, 16, 127, 128, 2047, 2048, MAX_FIELD_NUMBER];
        let wire_types = [
            WireType::Varint,
            WireType::Fixed64,
            WireType::LengthDelimited,
            WireType::Fixed32,
        ];
        for number in numbers {
            for wire_type in wire_types {
                let tag = FieldTag::new(number, wire_type).unwrap();
                let recovered = FieldTag::decompose(tag.encoded()).unwrap();
                assert_eq!(tag, recovered);
            }
        }
    }

    #[test]
    fn test_tag_known_byte() {
        // Field 1, varint: (1 << 3) | 0 = 0x08.
        let tag = FieldTag::new(1, WireType::Varint).unwrap();
        assert_eq!(tag.encoded(), 0x08);
    }

    #[test]
    fn test_invalid_field_numbers() {
        assert!(FieldTag::new(0, WireType::Varint).is_none());
        assert!(FieldTag::new(MAX_FIELD_NUMBER + 1, WireType::Varint).is_none());
        assert!(matches!(
            FieldTag::decompose(0), // field number 0, varint
            Err(DecodeError::InvalidFieldNumber { number: 0 })
        ));
    }
}
