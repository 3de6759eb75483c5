//! The closed value union carried through encode and dynamic decode.
//!
//! Encoding and shaped decoding are each a single `match` over
//! [`WireValue`] / [`Shape`]; no runtime type-identity dispatch exists
//! anywhere in the codec.

use std::borrow::Cow;

use crate::model::WireType;

/// An ordered field list: the schema-less message representation.
///
/// Pairs of (field number, value) in visitation order. Duplicate numbers
/// are legal and follow proto3 semantics on decode (last one wins for
/// singular reads, all occurrences for repeated reads).
pub type Record<'a> = Vec<(u32, WireValue<'a>)>;

/// A value that can appear on the wire.
///
/// Strings and byte blobs borrow from the decoded buffer where possible
/// (zero-copy); encoding accepts either borrowed or owned data.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue<'a> {
    Bool(bool),
    /// Signed 32-bit, varint-encoded by sign extension to 64 bits.
    /// No zigzag transform: this is proto3 `int32`, not `sint32`.
    Int32(i32),
    /// Signed 64-bit, varint-encoded via two's-complement reinterpretation.
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    /// IEEE 754 single, fixed32 framing.
    Float(f32),
    /// IEEE 754 double, fixed64 framing.
    Double(f64),
    /// UTF-8 text, length-delimited.
    Str(Cow<'a, str>),
    /// Opaque bytes, length-delimited.
    Bytes(Cow<'a, [u8]>),
    /// Nested message, length-delimited.
    Record(Record<'a>),
    /// Repeated field. Numeric scalar elements are packed into one
    /// length-delimited run; strings, bytes, and records are emitted as
    /// one occurrence per element.
    Repeated(Vec<WireValue<'a>>),
}

impl WireValue<'_> {
    /// Returns the wire framing for this value, or None for repeated
    /// values (framing depends on the element type).
    pub fn wire_type(&self) -> Option<WireType> {
        match self {
            WireValue::Bool(_)
            | WireValue::Int32(_)
            | WireValue::Int64(_)
            | WireValue::UInt32(_)
            | WireValue::UInt64(_) => Some(WireType::Varint),
            WireValue::Float(_) => Some(WireType::Fixed32),
            WireValue::Double(_) => Some(WireType::Fixed64),
            WireValue::Str(_) | WireValue::Bytes(_) | WireValue::Record(_) => {
                Some(WireType::LengthDelimited)
            }
            WireValue::Repeated(_) => None,
        }
    }

    /// Converts borrowed data to owned, detaching from the source buffer.
    pub fn into_owned(self) -> WireValue<'static> {
        match self {
            WireValue::Bool(v) => WireValue::Bool(v),
            WireValue::Int32(v) => WireValue::Int32(v),
            WireValue::Int64(v) => WireValue::Int64(v),
            WireValue::UInt32(v) => WireValue::UInt32(v),
            WireValue::UInt64(v) => WireValue::UInt64(v),
            WireValue::Float(v) => WireValue::Float(v),
            WireValue::Double(v) => WireValue::Double(v),
            WireValue::Str(v) => WireValue::Str(Cow::Owned(v.into_owned())),
            WireValue::Bytes(v) => WireValue::Bytes(Cow::Owned(v.into_owned())),
            WireValue::Record(fields) => WireValue::Record(
                fields
                    .into_iter()
                    .map(|(n, v)| (n, v.into_owned()))
                    .collect(),
            ),
            WireValue::Repeated(items) => {
                WireValue::Repeated(items.into_iter().map(WireValue::into_owned).collect())
            }
        }
    }
}

/// The requested shape for a shaped (schema-less) decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Bool,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    Bytes,
    /// Ordered list of a single element shape.
    Repeated(Box<Shape>),
    /// Nested message with its own (field number, shape) mapping.
    Record(Vec<(u32, Shape)>),
}

impl Shape {
    /// Returns the wire framing fields of this shape use, or None for
    /// repeated shapes (numeric elements may arrive packed or unpacked).
    pub fn wire_type(&self) -> Option<WireType> {
        match self {
            Shape::Bool | Shape::Int32 | Shape::Int64 | Shape::UInt32 | Shape::UInt64 => {
                Some(WireType::Varint)
            }
            Shape::Float => Some(WireType::Fixed32),
            Shape::Double => Some(WireType::Fixed64),
            Shape::String | Shape::Bytes | Shape::Record(_) => Some(WireType::LengthDelimited),
            Shape::Repeated(_) => None,
        }
    }

    /// Returns the proto3 default value for a field of this shape that is
    /// absent from the stream.
    pub fn default_value(&self) -> WireValue<'static> {
        match self {
            Shape::Bool => WireValue::Bool(false),
            Shape::Int32 => WireValue::Int32(0),
            Shape::Int64 => WireValue::Int64(0),
            Shape::UInt32 => WireValue::UInt32(0),
            Shape::UInt64 => WireValue::UInt64(0),
            Shape::Float => WireValue::Float(0.0),
            Shape::Double => WireValue::Double(0.0),
            Shape::String => WireValue::Str(Cow::Borrowed("")),
            Shape::Bytes => WireValue::Bytes(Cow::Borrowed(&[])),
            Shape::Repeated(_) => WireValue::Repeated(Vec::new()),
            Shape::Record(fields) => WireValue::Record(
                fields
                    .iter()
                    .map(|(n, s)| (*n, s.default_value()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_wire_types() {
        assert_eq!(WireValue::Bool(true).wire_type(), Some(WireType::Varint));
        assert_eq!(WireValue::Int32(-1).wire_type(), Some(WireType::Varint));
        assert_eq!(WireValue::Float(1.0).wire_type(), Some(WireType::Fixed32));
        assert_eq!(WireValue::Double(1.0).wire_type(), Some(WireType::Fixed64));
        assert_eq!(
            WireValue::Str(Cow::Borrowed("x")).wire_type(),
            Some(WireType::LengthDelimited)
        );
        assert_eq!(WireValue::Repeated(vec![]).wire_type(), None);
    }

    #[test]
    fn test_shape_defaults() {
        assert_eq!(Shape::Bool.default_value(), WireValue::Bool(false));
        assert_eq!(Shape::Int32.default_value(), WireValue::Int32(0));
        assert_eq!(
            Shape::String.default_value(),
            WireValue::Str(Cow::Borrowed(""))
        );
        assert_eq!(
            Shape::Repeated(Box::new(Shape::Int32)).default_value(),
            WireValue::Repeated(vec![])
        );
    }

    #[test]
    fn test_into_owned() {
        let borrowed = WireValue::Record(vec![
            (1, WireValue::Str(Cow::Borrowed("hi"))),
            (2, WireValue::Repeated(vec![WireValue::Int32(1)])),
        ]);
        let owned = borrowed.clone().into_owned();
        assert_eq!(borrowed, owned);
    }
}
