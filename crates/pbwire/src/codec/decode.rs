//! Decoding containers: keyed, sequential, and nested-message readers.
//!
//! Readers interpret the raw field spans produced by the scanner against
//! a requested shape. Field absence is never an error: plain reads yield
//! the proto3 default, optional reads yield `None`.

use std::borrow::Cow;

use crate::codec::Message;
use crate::codec::primitives::Reader;
use crate::codec::scan::{FieldIndex, RawField};
use crate::error::DecodeError;
use crate::limits::MAX_NESTING_DEPTH;
use crate::model::{IntWidth, Record, ResolvedWidth, Shape, WireType, WireValue};

/// Decoder configuration, resolved once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    width: ResolvedWidth,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(IntWidth::Native)
    }
}

impl Decoder {
    /// Creates a decoder with the given integer-width strategy.
    pub fn new(width: IntWidth) -> Self {
        Self {
            width: width.resolve(),
        }
    }

    /// Decodes a message from proto3 wire format.
    pub fn decode<M: Message>(&self, input: &[u8]) -> Result<M, DecodeError> {
        let reader = MessageReader::with_depth(input, self.width, 0)?;
        M::decode_fields(&reader)
    }

    /// Decodes a buffer against a requested shape (zero-copy: strings and
    /// bytes in the result borrow from `input`).
    ///
    /// - `Shape::Record` treats the buffer as a message and reads the
    ///   listed fields by number.
    /// - `Shape::Repeated` consumes every field occurrence sequentially in
    ///   stream order, ignoring field-number grouping.
    /// - A scalar shape reads the buffer as one untagged payload: a bare
    ///   varint, fixed-width value, or the raw string/byte content.
    pub fn decode_shaped<'a>(
        &self,
        input: &'a [u8],
        shape: &Shape,
    ) -> Result<WireValue<'a>, DecodeError> {
        match shape {
            Shape::Record(fields) => {
                let reader = MessageReader::with_depth(input, self.width, 0)?;
                Ok(WireValue::Record(reader.read_record(fields)?))
            }
            Shape::Repeated(element) => {
                let reader = MessageReader::with_depth(input, self.width, 0)?;
                let mut items = Vec::new();
                for raw in reader.raw_fields() {
                    items.extend(reader.elements_of(raw, element)?);
                }
                Ok(WireValue::Repeated(items))
            }
            Shape::Bool => {
                let mut r = Reader::new(input);
                Ok(WireValue::Bool(r.read_varint("bool")? != 0))
            }
            Shape::Int32 => {
                let mut r = Reader::new(input);
                Ok(WireValue::Int32(r.read_varint("int32")? as i64 as i32))
            }
            Shape::Int64 => {
                let mut r = Reader::new(input);
                Ok(WireValue::Int64(r.read_varint("int64")? as i64))
            }
            Shape::UInt32 => {
                let mut r = Reader::new(input);
                Ok(WireValue::UInt32(r.read_varint("uint32")? as u32))
            }
            Shape::UInt64 => {
                let mut r = Reader::new(input);
                Ok(WireValue::UInt64(r.read_varint("uint64")?))
            }
            Shape::Float => {
                let mut r = Reader::new(input);
                Ok(WireValue::Float(f32::from_bits(r.read_fixed32("float")?)))
            }
            Shape::Double => {
                let mut r = Reader::new(input);
                Ok(WireValue::Double(f64::from_bits(r.read_fixed64("double")?)))
            }
            Shape::String => {
                let s = std::str::from_utf8(input)
                    .map_err(|_| DecodeError::InvalidUtf8 { field: "string" })?;
                Ok(WireValue::Str(Cow::Borrowed(s)))
            }
            Shape::Bytes => Ok(WireValue::Bytes(Cow::Borrowed(input))),
        }
    }
}

/// Keyed and sequential field reader handed to [`Message::decode_fields`].
///
/// Wraps the immutable [`FieldIndex`] built by one scan pass. Singular
/// reads resolve duplicates with last-one-wins; repeated reads consume
/// every occurrence in stream order.
#[derive(Debug)]
pub struct MessageReader<'a> {
    index: FieldIndex<'a>,
    width: ResolvedWidth,
    depth: usize,
}

impl<'a> MessageReader<'a> {
    pub(crate) fn with_depth(
        input: &'a [u8],
        width: ResolvedWidth,
        depth: usize,
    ) -> Result<MessageReader<'a>, DecodeError> {
        Ok(MessageReader {
            index: FieldIndex::scan(input)?,
            width,
            depth,
        })
    }

    fn expect(&self, raw: &RawField, expected: WireType) -> Result<(), DecodeError> {
        if raw.wire_type != expected {
            return Err(DecodeError::WireTypeMismatch {
                number: raw.number,
                expected,
                found: raw.wire_type,
            });
        }
        Ok(())
    }

    fn varint_of(&self, raw: &RawField) -> Result<u64, DecodeError> {
        Reader::new(self.index.bytes(raw)).read_varint("varint field")
    }

    /// Last varint occurrence of a field, or None if absent.
    fn varint_field(&self, number: u32) -> Result<Option<u64>, DecodeError> {
        match self.index.last(number) {
            Some(raw) => {
                self.expect(raw, WireType::Varint)?;
                Ok(Some(self.varint_of(raw)?))
            }
            None => Ok(None),
        }
    }

    fn fixed32_field(&self, number: u32) -> Result<Option<u32>, DecodeError> {
        match self.index.last(number) {
            Some(raw) => {
                self.expect(raw, WireType::Fixed32)?;
                Ok(Some(Reader::new(self.index.bytes(raw)).read_fixed32("fixed32 field")?))
            }
            None => Ok(None),
        }
    }

    fn fixed64_field(&self, number: u32) -> Result<Option<u64>, DecodeError> {
        match self.index.last(number) {
            Some(raw) => {
                self.expect(raw, WireType::Fixed64)?;
                Ok(Some(Reader::new(self.index.bytes(raw)).read_fixed64("fixed64 field")?))
            }
            None => Ok(None),
        }
    }

    fn bytes_field(&self, number: u32) -> Result<Option<&'a [u8]>, DecodeError> {
        match self.index.last(number) {
            Some(raw) => {
                self.expect(raw, WireType::LengthDelimited)?;
                Ok(Some(self.index.bytes(raw)))
            }
            None => Ok(None),
        }
    }

    fn nested(&self, payload: &'a [u8]) -> Result<MessageReader<'a>, DecodeError> {
        if self.depth + 1 > MAX_NESTING_DEPTH {
            return Err(DecodeError::DepthLimitExceeded {
                max: MAX_NESTING_DEPTH,
            });
        }
        MessageReader::with_depth(payload, self.width, self.depth + 1)
    }

    /// Returns true if the field number appears at least once.
    pub fn contains(&self, number: u32) -> bool {
        self.index.contains(number)
    }

    // === Singular scalars (absent fields yield the proto3 default) ===

    pub fn read_bool(&self, number: u32) -> Result<bool, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v != 0).unwrap_or(false))
    }

    /// Reads an int32 field: the sign-extended wire value is truncated
    /// back to 32 bits (proto3 `int32`, no zigzag).
    pub fn read_int32(&self, number: u32) -> Result<i32, DecodeError> {
        Ok(self
            .varint_field(number)?
            .map(|v| v as i64 as i32)
            .unwrap_or(0))
    }

    pub fn read_int64(&self, number: u32) -> Result<i64, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v as i64).unwrap_or(0))
    }

    pub fn read_uint32(&self, number: u32) -> Result<u32, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v as u32).unwrap_or(0))
    }

    pub fn read_uint64(&self, number: u32) -> Result<u64, DecodeError> {
        Ok(self.varint_field(number)?.unwrap_or(0))
    }

    pub fn read_float(&self, number: u32) -> Result<f32, DecodeError> {
        Ok(self
            .fixed32_field(number)?
            .map(f32::from_bits)
            .unwrap_or(0.0))
    }

    pub fn read_double(&self, number: u32) -> Result<f64, DecodeError> {
        Ok(self
            .fixed64_field(number)?
            .map(f64::from_bits)
            .unwrap_or(0.0))
    }

    /// Reads a string field, borrowing from the input buffer.
    pub fn read_str(&self, number: u32) -> Result<&'a str, DecodeError> {
        match self.bytes_field(number)? {
            Some(bytes) => {
                std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field: "string" })
            }
            None => Ok(""),
        }
    }

    /// Reads a string field as an owned String.
    pub fn read_string(&self, number: u32) -> Result<String, DecodeError> {
        Ok(self.read_str(number)?.to_string())
    }

    /// Reads a bytes field, borrowing from the input buffer.
    pub fn read_bytes(&self, number: u32) -> Result<&'a [u8], DecodeError> {
        Ok(self.bytes_field(number)?.unwrap_or(&[]))
    }

    // === Platform-width integers ===

    /// Reads a platform-width signed integer under the configured width.
    pub fn read_int(&self, number: u32) -> Result<isize, DecodeError> {
        let Some(wire) = self.varint_field(number)? else {
            return Ok(0);
        };
        let value = wire as i64;
        if !self.width.fits_signed(value) {
            return Err(DecodeError::IntOutOfRange {
                number,
                width: self.width,
            });
        }
        isize::try_from(value).map_err(|_| DecodeError::IntOutOfRange {
            number,
            width: self.width,
        })
    }

    /// Reads a platform-width unsigned integer under the configured width.
    pub fn read_uint(&self, number: u32) -> Result<usize, DecodeError> {
        let Some(wire) = self.varint_field(number)? else {
            return Ok(0);
        };
        if !self.width.fits_unsigned(wire) {
            return Err(DecodeError::IntOutOfRange {
                number,
                width: self.width,
            });
        }
        usize::try_from(wire).map_err(|_| DecodeError::IntOutOfRange {
            number,
            width: self.width,
        })
    }

    // === Optionals (absent fields yield None, never an error) ===

    pub fn read_opt_bool(&self, number: u32) -> Result<Option<bool>, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v != 0))
    }

    pub fn read_opt_int32(&self, number: u32) -> Result<Option<i32>, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v as i64 as i32))
    }

    pub fn read_opt_int64(&self, number: u32) -> Result<Option<i64>, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v as i64))
    }

    pub fn read_opt_uint32(&self, number: u32) -> Result<Option<u32>, DecodeError> {
        Ok(self.varint_field(number)?.map(|v| v as u32))
    }

    pub fn read_opt_uint64(&self, number: u32) -> Result<Option<u64>, DecodeError> {
        self.varint_field(number)
    }

    pub fn read_opt_float(&self, number: u32) -> Result<Option<f32>, DecodeError> {
        Ok(self.fixed32_field(number)?.map(f32::from_bits))
    }

    pub fn read_opt_double(&self, number: u32) -> Result<Option<f64>, DecodeError> {
        Ok(self.fixed64_field(number)?.map(f64::from_bits))
    }

    pub fn read_opt_str(&self, number: u32) -> Result<Option<&'a str>, DecodeError> {
        match self.bytes_field(number)? {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|_| DecodeError::InvalidUtf8 { field: "string" }),
            None => Ok(None),
        }
    }

    pub fn read_opt_bytes(&self, number: u32) -> Result<Option<&'a [u8]>, DecodeError> {
        self.bytes_field(number)
    }

    // === Repeated scalars ===
    //
    // Every occurrence is consumed in stream order. A length-delimited
    // occurrence is unpacked element by element until its span is
    // exhausted; a varint/fixed occurrence contributes one element.
    // Decoders accept both representations, per proto3.

    fn repeated_varints(&self, number: u32) -> Result<Vec<u64>, DecodeError> {
        let mut out = Vec::new();
        for raw in self.index.all(number) {
            match raw.wire_type {
                WireType::Varint => out.push(self.varint_of(raw)?),
                WireType::LengthDelimited => {
                    let mut r = Reader::new(self.index.bytes(raw));
                    while !r.is_empty() {
                        out.push(r.read_varint("packed varint element")?);
                    }
                }
                found => {
                    return Err(DecodeError::WireTypeMismatch {
                        number,
                        expected: WireType::Varint,
                        found,
                    });
                }
            }
        }
        Ok(out)
    }

    fn repeated_fixed32(&self, number: u32) -> Result<Vec<u32>, DecodeError> {
        let mut out = Vec::new();
        for raw in self.index.all(number) {
            match raw.wire_type {
                WireType::Fixed32 => {
                    out.push(Reader::new(self.index.bytes(raw)).read_fixed32("fixed32 field")?);
                }
                WireType::LengthDelimited => {
                    let mut r = Reader::new(self.index.bytes(raw));
                    while !r.is_empty() {
                        out.push(r.read_fixed32("packed fixed32 element")?);
                    }
                }
                found => {
                    return Err(DecodeError::WireTypeMismatch {
                        number,
                        expected: WireType::Fixed32,
                        found,
                    });
                }
            }
        }
        Ok(out)
    }

    fn repeated_fixed64(&self, number: u32) -> Result<Vec<u64>, DecodeError> {
        let mut out = Vec::new();
        for raw in self.index.all(number) {
            match raw.wire_type {
                WireType::Fixed64 => {
                    out.push(Reader::new(self.index.bytes(raw)).read_fixed64("fixed64 field")?);
                }
                WireType::LengthDelimited => {
                    let mut r = Reader::new(self.index.bytes(raw));
                    while !r.is_empty() {
                        out.push(r.read_fixed64("packed fixed64 element")?);
                    }
                }
                found => {
                    return Err(DecodeError::WireTypeMismatch {
                        number,
                        expected: WireType::Fixed64,
                        found,
                    });
                }
            }
        }
        Ok(out)
    }

    pub fn read_repeated_bool(&self, number: u32) -> Result<Vec<bool>, DecodeError> {
        Ok(self
            .repeated_varints(number)?
            .into_iter()
            .map(|v| v != 0)
            .collect())
    }

    pub fn read_repeated_int32(&self, number: u32) -> Result<Vec<i32>, DecodeError> {
        Ok(self
            .repeated_varints(number)?
            .into_iter()
            .map(|v| v as i64 as i32)
            .collect())
    }

    pub fn read_repeated_int64(&self, number: u32) -> Result<Vec<i64>, DecodeError> {
        Ok(self
            .repeated_varints(number)?
            .into_iter()
            .map(|v| v as i64)
            .collect())
    }

    pub fn read_repeated_uint32(&self, number: u32) -> Result<Vec<u32>, DecodeError> {
        Ok(self
            .repeated_varints(number)?
            .into_iter()
            .map(|v| v as u32)
            .collect())
    }

    pub fn read_repeated_uint64(&self, number: u32) -> Result<Vec<u64>, DecodeError> {
        self.repeated_varints(number)
    }

    pub fn read_repeated_float(&self, number: u32) -> Result<Vec<f32>, DecodeError> {
        Ok(self
            .repeated_fixed32(number)?
            .into_iter()
            .map(f32::from_bits)
            .collect())
    }

    pub fn read_repeated_double(&self, number: u32) -> Result<Vec<f64>, DecodeError> {
        Ok(self
            .repeated_fixed64(number)?
            .into_iter()
            .map(f64::from_bits)
            .collect())
    }

    // === Repeated strings / bytes (never packed) ===

    pub fn read_string_list(&self, number: u32) -> Result<Vec<String>, DecodeError> {
        let mut out = Vec::new();
        for raw in self.index.all(number) {
            self.expect(raw, WireType::LengthDelimited)?;
            let s = std::str::from_utf8(self.index.bytes(raw))
                .map_err(|_| DecodeError::InvalidUtf8 { field: "string" })?;
            out.push(s.to_string());
        }
        Ok(out)
    }

    pub fn read_bytes_list(&self, number: u32) -> Result<Vec<&'a [u8]>, DecodeError> {
        let mut out = Vec::new();
        for raw in self.index.all(number) {
            self.expect(raw, WireType::LengthDelimited)?;
            out.push(self.index.bytes(raw));
        }
        Ok(out)
    }

    // === Nested messages ===

    /// Reads a nested message by explicit field number and type.
    ///
    /// The payload span is re-scanned into its own scoped index and
    /// decoded recursively. An absent field decodes the target type from
    /// an empty buffer, yielding all defaults.
    pub fn read_message<M: Message>(&self, number: u32) -> Result<M, DecodeError> {
        match self.read_opt_message(number)? {
            Some(message) => Ok(message),
            None => M::decode_fields(&self.nested(&[])?),
        }
    }

    /// Reads a nested message, or None if the field is absent.
    pub fn read_opt_message<M: Message>(&self, number: u32) -> Result<Option<M>, DecodeError> {
        match self.index.last(number) {
            Some(raw) => {
                self.expect(raw, WireType::LengthDelimited)?;
                let sub = self.nested(self.index.bytes(raw))?;
                Ok(Some(M::decode_fields(&sub)?))
            }
            None => Ok(None),
        }
    }

    /// Reads all occurrences of a repeated message field, in order.
    pub fn read_message_list<M: Message>(&self, number: u32) -> Result<Vec<M>, DecodeError> {
        let mut out = Vec::new();
        for raw in self.index.all(number) {
            self.expect(raw, WireType::LengthDelimited)?;
            let sub = self.nested(self.index.bytes(raw))?;
            out.push(M::decode_fields(&sub)?);
        }
        Ok(out)
    }

    // === Sequential and shaped reads ===

    /// Iterates raw field occurrences in original stream order, ignoring
    /// field-number grouping.
    pub fn raw_fields(&self) -> impl Iterator<Item = &RawField> {
        self.index.iter()
    }

    /// Decodes one raw occurrence against a shape: one switch over the
    /// closed shape union.
    pub fn read_raw(&self, raw: &RawField, shape: &Shape) -> Result<WireValue<'a>, DecodeError> {
        match shape {
            Shape::Bool => {
                self.expect(raw, WireType::Varint)?;
                Ok(WireValue::Bool(self.varint_of(raw)? != 0))
            }
            Shape::Int32 => {
                self.expect(raw, WireType::Varint)?;
                Ok(WireValue::Int32(self.varint_of(raw)? as i64 as i32))
            }
            Shape::Int64 => {
                self.expect(raw, WireType::Varint)?;
                Ok(WireValue::Int64(self.varint_of(raw)? as i64))
            }
            Shape::UInt32 => {
                self.expect(raw, WireType::Varint)?;
                Ok(WireValue::UInt32(self.varint_of(raw)? as u32))
            }
            Shape::UInt64 => {
                self.expect(raw, WireType::Varint)?;
                Ok(WireValue::UInt64(self.varint_of(raw)?))
            }
            Shape::Float => {
                self.expect(raw, WireType::Fixed32)?;
                let bits = Reader::new(self.index.bytes(raw)).read_fixed32("float field")?;
                Ok(WireValue::Float(f32::from_bits(bits)))
            }
            Shape::Double => {
                self.expect(raw, WireType::Fixed64)?;
                let bits = Reader::new(self.index.bytes(raw)).read_fixed64("double field")?;
                Ok(WireValue::Double(f64::from_bits(bits)))
            }
            Shape::String => {
                self.expect(raw, WireType::LengthDelimited)?;
                let s = std::str::from_utf8(self.index.bytes(raw))
                    .map_err(|_| DecodeError::InvalidUtf8 { field: "string" })?;
                Ok(WireValue::Str(Cow::Borrowed(s)))
            }
            Shape::Bytes => {
                self.expect(raw, WireType::LengthDelimited)?;
                Ok(WireValue::Bytes(Cow::Borrowed(self.index.bytes(raw))))
            }
            Shape::Record(fields) => {
                self.expect(raw, WireType::LengthDelimited)?;
                let sub = self.nested(self.index.bytes(raw))?;
                Ok(WireValue::Record(sub.read_record(fields)?))
            }
            Shape::Repeated(element) => {
                Ok(WireValue::Repeated(self.elements_of(raw, element)?))
            }
        }
    }

    /// Reads a whole record: for each requested (number, shape) pair,
    /// repeated shapes gather all occurrences, everything else resolves
    /// the last occurrence or falls back to the shape's default.
    pub fn read_record(&self, fields: &[(u32, Shape)]) -> Result<Record<'a>, DecodeError> {
        let mut out = Vec::with_capacity(fields.len());
        for (number, shape) in fields {
            let value = match shape {
                Shape::Repeated(element) => {
                    let mut items = Vec::new();
                    for raw in self.index.all(*number) {
                        items.extend(self.elements_of(raw, element)?);
                    }
                    WireValue::Repeated(items)
                }
                _ => match self.index.last(*number) {
                    Some(raw) => self.read_raw(raw, shape)?,
                    None => shape.default_value(),
                },
            };
            out.push((*number, value));
        }
        Ok(out)
    }

    /// Expands one occurrence of a repeated field into its elements.
    ///
    /// Numeric scalar shapes unpack a length-delimited occurrence as a
    /// packed run; strings, bytes, and records are always exactly one
    /// element per occurrence.
    fn elements_of(
        &self,
        raw: &RawField,
        element: &Shape,
    ) -> Result<Vec<WireValue<'a>>, DecodeError> {
        match element {
            Shape::Bool | Shape::Int32 | Shape::Int64 | Shape::UInt32 | Shape::UInt64 => {
                match raw.wire_type {
                    WireType::Varint => Ok(vec![varint_to_value(element, self.varint_of(raw)?)]),
                    WireType::LengthDelimited => {
                        let mut r = Reader::new(self.index.bytes(raw));
                        let mut items = Vec::new();
                        while !r.is_empty() {
                            items.push(varint_to_value(
                                element,
                                r.read_varint("packed varint element")?,
                            ));
                        }
                        Ok(items)
                    }
                    found => Err(DecodeError::WireTypeMismatch {
                        number: raw.number,
                        expected: WireType::Varint,
                        found,
                    }),
                }
            }
            Shape::Float => match raw.wire_type {
                WireType::Fixed32 => {
                    let bits = Reader::new(self.index.bytes(raw)).read_fixed32("float field")?;
                    Ok(vec![WireValue::Float(f32::from_bits(bits))])
                }
                WireType::LengthDelimited => {
                    let mut r = Reader::new(self.index.bytes(raw));
                    let mut items = Vec::new();
                    while !r.is_empty() {
                        items.push(WireValue::Float(f32::from_bits(
                            r.read_fixed32("packed float element")?,
                        )));
                    }
                    Ok(items)
                }
                found => Err(DecodeError::WireTypeMismatch {
                    number: raw.number,
                    expected: WireType::Fixed32,
                    found,
                }),
            },
            Shape::Double => match raw.wire_type {
                WireType::Fixed64 => {
                    let bits = Reader::new(self.index.bytes(raw)).read_fixed64("double field")?;
                    Ok(vec![WireValue::Double(f64::from_bits(bits))])
                }
                WireType::LengthDelimited => {
                    let mut r = Reader::new(self.index.bytes(raw));
                    let mut items = Vec::new();
                    while !r.is_empty() {
                        items.push(WireValue::Double(f64::from_bits(
                            r.read_fixed64("packed double element")?,
                        )));
                    }
                    Ok(items)
                }
                found => Err(DecodeError::WireTypeMismatch {
                    number: raw.number,
                    expected: WireType::Fixed64,
                    found,
                }),
            },
            _ => Ok(vec![self.read_raw(raw, element)?]),
        }
    }
}

fn varint_to_value(shape: &Shape, wire: u64) -> WireValue<'static> {
    match shape {
        Shape::Bool => WireValue::Bool(wire != 0),
        Shape::Int32 => WireValue::Int32(wire as i64 as i32),
        Shape::Int64 => WireValue::Int64(wire as i64),
        Shape::UInt32 => WireValue::UInt32(wire as u32),
        // Callers only pass varint-framed shapes
        _ => WireValue::UInt64(wire),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::Encoder;
    use crate::codec::primitives::Writer;
    use crate::model::FieldTag;

    fn reader(input: &[u8]) -> MessageReader<'_> {
        MessageReader::with_depth(input, ResolvedWidth::W64, 0).unwrap()
    }

    #[test]
    fn test_missing_fields_yield_defaults() {
        let r = reader(&[]);
        assert!(!r.read_bool(1).unwrap());
        assert_eq!(r.read_int32(2).unwrap(), 0);
        assert_eq!(r.read_double(3).unwrap(), 0.0);
        assert_eq!(r.read_str(4).unwrap(), "");
        assert_eq!(r.read_bytes(5).unwrap(), &[] as &[u8]);
        assert_eq!(r.read_repeated_int32(6).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_missing_optional_fields_yield_none() {
        let r = reader(&[]);
        assert_eq!(r.read_opt_bool(1).unwrap(), None);
        assert_eq!(r.read_opt_int32(2).unwrap(), None);
        assert_eq!(r.read_opt_str(3).unwrap(), None);
        assert_eq!(r.read_opt_double(4).unwrap(), None);
    }

    #[test]
    fn test_last_one_wins_for_singular() {
        let mut w = Writer::new();
        for v in [1u64, 2, 3] {
            w.write_tag(FieldTag::new(1, WireType::Varint).unwrap());
            w.write_varint(v);
        }
        let buf = w.into_bytes();
        let r = reader(&buf);
        assert_eq!(r.read_uint64(1).unwrap(), 3);
    }

    #[test]
    fn test_wire_type_mismatch() {
        let mut w = Writer::new();
        w.write_tag(FieldTag::new(1, WireType::Fixed64).unwrap());
        w.write_fixed64(5);
        let buf = w.into_bytes();
        let r = reader(&buf);
        assert!(matches!(
            r.read_int32(1),
            Err(DecodeError::WireTypeMismatch {
                number: 1,
                expected: WireType::Varint,
                found: WireType::Fixed64,
            })
        ));
    }

    #[test]
    fn test_repeated_accepts_packed_and_unpacked() {
        // Packed run [1, 2] followed by an unpacked occurrence 3
        let mut w = Writer::new();
        w.write_tag(FieldTag::new(7, WireType::LengthDelimited).unwrap());
        w.write_len_prefixed(&[0x01, 0x02]);
        w.write_tag(FieldTag::new(7, WireType::Varint).unwrap());
        w.write_varint(3);
        let buf = w.into_bytes();
        let r = reader(&buf);
        assert_eq!(r.read_repeated_int32(7).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let mut w = Writer::new();
        w.write_tag(FieldTag::new(1, WireType::LengthDelimited).unwrap());
        w.write_len_prefixed(&[0xFF, 0xFE]);
        let buf = w.into_bytes();
        let r = reader(&buf);
        assert!(matches!(
            r.read_str(1),
            Err(DecodeError::InvalidUtf8 { .. })
        ));
        // The same payload is fine as bytes
        assert_eq!(r.read_bytes(1).unwrap(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_width_strategy_on_decode() {
        let mut w = Writer::new();
        w.write_tag(FieldTag::new(1, WireType::Varint).unwrap());
        w.write_varint(u32::MAX as u64 + 1);
        let buf = w.into_bytes();

        let r32 = MessageReader::with_depth(&buf, ResolvedWidth::W32, 0).unwrap();
        assert!(matches!(
            r32.read_uint(1),
            Err(DecodeError::IntOutOfRange { number: 1, .. })
        ));

        let r64 = MessageReader::with_depth(&buf, ResolvedWidth::W64, 0).unwrap();
        assert_eq!(r64.read_uint(1).unwrap(), u32::MAX as usize + 1);
    }

    #[test]
    fn test_nesting_depth_limit() {
        // A message nested past the depth limit: build innermost-out
        let mut buf = Vec::new();
        for _ in 0..(MAX_NESTING_DEPTH + 2) {
            let mut w = Writer::new();
            w.write_tag(FieldTag::new(1, WireType::LengthDelimited).unwrap());
            w.write_len_prefixed(&buf);
            buf = w.into_bytes();
        }

        // Walk down via shaped decode; each level is Record { 1: Record }
        let mut shape = Shape::Record(vec![]);
        for _ in 0..(MAX_NESTING_DEPTH + 2) {
            shape = Shape::Record(vec![(1, shape)]);
        }
        let decoder = Decoder::new(IntWidth::SixtyFour);
        let result = decoder.decode_shaped(&buf, &shape);
        assert!(matches!(
            result,
            Err(DecodeError::DepthLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_shaped_record_decode() {
        let encoder = Encoder::new(IntWidth::SixtyFour);
        let record: Record<'static> = vec![
            (1, WireValue::Int32(23)),
            (
                2,
                WireValue::Repeated(vec![
                    WireValue::Str(Cow::Owned("AAAAA".to_string())),
                    WireValue::Str(Cow::Owned("BBBBB".to_string())),
                ]),
            ),
        ];
        let bytes = encoder.encode_record(&record).unwrap();

        let shape = Shape::Record(vec![
            (1, Shape::Int32),
            (2, Shape::Repeated(Box::new(Shape::String))),
        ]);
        let decoder = Decoder::new(IntWidth::SixtyFour);
        let decoded = decoder.decode_shaped(&bytes, &shape).unwrap();
        assert_eq!(decoded, WireValue::Record(record));
    }

    #[test]
    fn test_shaped_sequential_decode() {
        // Sequential read ignores field-number grouping
        let mut w = Writer::new();
        for (number, v) in [(3u32, 10u64), (1, 20), (3, 30)] {
            w.write_tag(FieldTag::new(number, WireType::Varint).unwrap());
            w.write_varint(v);
        }
        let buf = w.into_bytes();

        let decoder = Decoder::default();
        let decoded = decoder
            .decode_shaped(&buf, &Shape::Repeated(Box::new(Shape::UInt64)))
            .unwrap();
        assert_eq!(
            decoded,
            WireValue::Repeated(vec![
                WireValue::UInt64(10),
                WireValue::UInt64(20),
                WireValue::UInt64(30),
            ])
        );
    }

    #[test]
    fn test_shaped_default_for_missing_field() {
        let shape = Shape::Record(vec![(9, Shape::String), (10, Shape::Int64)]);
        let decoder = Decoder::default();
        let decoded = decoder.decode_shaped(&[], &shape).unwrap();
        assert_eq!(
            decoded,
            WireValue::Record(vec![
                (9, WireValue::Str(Cow::Borrowed(""))),
                (10, WireValue::Int64(0)),
            ])
        );
    }
}
