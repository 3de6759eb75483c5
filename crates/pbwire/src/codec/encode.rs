//! Encoding containers: keyed, repeated, and nested-message writers.
//!
//! Fields are streamed tag + payload into one growable buffer in
//! visitation order. Encoding either fully succeeds or fails; a failed
//! encode never yields partial output.

use crate::codec::primitives::{Writer, int32_to_wire, int64_to_wire};
use crate::codec::Message;
use crate::error::EncodeError;
use crate::model::{FieldTag, IntWidth, Record, ResolvedWidth, WireType, WireValue};

/// Encoder configuration, resolved once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    width: ResolvedWidth,
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new(IntWidth::Native)
    }
}

impl Encoder {
    /// Creates an encoder with the given integer-width strategy.
    pub fn new(width: IntWidth) -> Self {
        Self {
            width: width.resolve(),
        }
    }

    /// Encodes a message to proto3 wire format.
    pub fn encode<M: Message>(&self, message: &M) -> Result<Vec<u8>, EncodeError> {
        let mut out = Writer::new();
        let mut writer = MessageWriter {
            out: &mut out,
            width: self.width,
        };
        message.encode_fields(&mut writer)?;
        Ok(out.into_bytes())
    }

    /// Encodes a schema-less ordered field list.
    pub fn encode_record(&self, record: &Record<'_>) -> Result<Vec<u8>, EncodeError> {
        let mut out = Writer::new();
        let mut writer = MessageWriter {
            out: &mut out,
            width: self.width,
        };
        for (number, value) in record {
            writer.write_value(*number, value)?;
        }
        Ok(out.into_bytes())
    }
}

/// Keyed field writer handed to [`Message::encode_fields`].
///
/// Each call emits tag + payload immediately. Elision policy: a `false`
/// bool is never emitted (proto3 implicit presence); every other value,
/// including numeric zero and the empty string, is emitted whenever the
/// caller writes it.
#[derive(Debug)]
pub struct MessageWriter<'a> {
    out: &'a mut Writer,
    width: ResolvedWidth,
}

impl MessageWriter<'_> {
    fn tag(&mut self, number: u32, wire_type: WireType) -> Result<FieldTag, EncodeError> {
        FieldTag::new(number, wire_type).ok_or(EncodeError::InvalidFieldNumber { number })
    }

    fn varint_field(&mut self, number: u32, wire: u64) -> Result<(), EncodeError> {
        let tag = self.tag(number, WireType::Varint)?;
        self.out.write_tag(tag);
        self.out.write_varint(wire);
        Ok(())
    }

    fn len_delimited_field(&mut self, number: u32, payload: &[u8]) -> Result<(), EncodeError> {
        let tag = self.tag(number, WireType::LengthDelimited)?;
        self.out.write_tag(tag);
        self.out.write_len_prefixed(payload);
        Ok(())
    }

    // === Singular scalars ===

    /// Writes a bool field. `false` is elided entirely.
    pub fn write_bool(&mut self, number: u32, value: bool) -> Result<(), EncodeError> {
        if !value {
            return Ok(());
        }
        self.varint_field(number, 1)
    }

    /// Writes an int32 field (sign-extended varint, no zigzag).
    pub fn write_int32(&mut self, number: u32, value: i32) -> Result<(), EncodeError> {
        self.varint_field(number, int32_to_wire(value))
    }

    /// Writes an int64 field (two's-complement varint, no zigzag).
    pub fn write_int64(&mut self, number: u32, value: i64) -> Result<(), EncodeError> {
        self.varint_field(number, int64_to_wire(value))
    }

    pub fn write_uint32(&mut self, number: u32, value: u32) -> Result<(), EncodeError> {
        self.varint_field(number, value as u64)
    }

    pub fn write_uint64(&mut self, number: u32, value: u64) -> Result<(), EncodeError> {
        self.varint_field(number, value)
    }

    /// Writes a float field as its fixed32 IEEE 754 bit pattern.
    pub fn write_float(&mut self, number: u32, value: f32) -> Result<(), EncodeError> {
        let tag = self.tag(number, WireType::Fixed32)?;
        self.out.write_tag(tag);
        self.out.write_fixed32(value.to_bits());
        Ok(())
    }

    /// Writes a double field as its fixed64 IEEE 754 bit pattern.
    pub fn write_double(&mut self, number: u32, value: f64) -> Result<(), EncodeError> {
        let tag = self.tag(number, WireType::Fixed64)?;
        self.out.write_tag(tag);
        self.out.write_fixed64(value.to_bits());
        Ok(())
    }

    pub fn write_string(&mut self, number: u32, value: &str) -> Result<(), EncodeError> {
        self.len_delimited_field(number, value.as_bytes())
    }

    pub fn write_bytes(&mut self, number: u32, value: &[u8]) -> Result<(), EncodeError> {
        self.len_delimited_field(number, value)
    }

    // === Platform-width integers ===

    /// Writes a platform-width signed integer under the configured width.
    ///
    /// A value outside the resolved width's range fails fast rather than
    /// silently truncating.
    pub fn write_int(&mut self, number: u32, value: isize) -> Result<(), EncodeError> {
        let v = value as i64;
        if !self.width.fits_signed(v) {
            return Err(EncodeError::IntOutOfRange {
                value: v as i128,
                width: self.width,
            });
        }
        self.varint_field(number, int64_to_wire(v))
    }

    /// Writes a platform-width unsigned integer under the configured width.
    pub fn write_uint(&mut self, number: u32, value: usize) -> Result<(), EncodeError> {
        let v = value as u64;
        if !self.width.fits_unsigned(v) {
            return Err(EncodeError::IntOutOfRange {
                value: v as i128,
                width: self.width,
            });
        }
        self.varint_field(number, v)
    }

    // === Optionals ===
    //
    // The optional wrapper itself has no wire representation: `None`
    // emits nothing, `Some(v)` emits the unwrapped payload directly under
    // the field's tag.

    pub fn write_opt_bool(&mut self, number: u32, value: Option<bool>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_bool(number, v))
    }

    pub fn write_opt_int32(&mut self, number: u32, value: Option<i32>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_int32(number, v))
    }

    pub fn write_opt_int64(&mut self, number: u32, value: Option<i64>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_int64(number, v))
    }

    pub fn write_opt_uint32(&mut self, number: u32, value: Option<u32>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_uint32(number, v))
    }

    pub fn write_opt_uint64(&mut self, number: u32, value: Option<u64>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_uint64(number, v))
    }

    pub fn write_opt_float(&mut self, number: u32, value: Option<f32>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_float(number, v))
    }

    pub fn write_opt_double(&mut self, number: u32, value: Option<f64>) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_double(number, v))
    }

    pub fn write_opt_string(
        &mut self,
        number: u32,
        value: Option<&str>,
    ) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_string(number, v))
    }

    pub fn write_opt_bytes(
        &mut self,
        number: u32,
        value: Option<&[u8]>,
    ) -> Result<(), EncodeError> {
        value.map_or(Ok(()), |v| self.write_bytes(number, v))
    }

    // === Packed repeated scalars ===
    //
    // Element encodings are concatenated into one buffer and emitted once
    // as a single length-delimited field. Empty lists emit nothing. Note
    // that elision does not apply inside a packed run: a `false` element
    // is encoded as the varint 0.

    /// Writes a packed repeated bool field.
    pub fn write_packed_bool(&mut self, number: u32, values: &[bool]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::with_capacity(values.len());
        for v in values {
            payload.write_varint(*v as u64);
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    /// Writes a packed repeated int32 field.
    pub fn write_packed_int32(&mut self, number: u32, values: &[i32]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::new();
        for v in values {
            payload.write_varint(int32_to_wire(*v));
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    /// Writes a packed repeated int64 field.
    pub fn write_packed_int64(&mut self, number: u32, values: &[i64]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::new();
        for v in values {
            payload.write_varint(int64_to_wire(*v));
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    /// Writes a packed repeated uint32 field.
    pub fn write_packed_uint32(&mut self, number: u32, values: &[u32]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::new();
        for v in values {
            payload.write_varint(*v as u64);
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    /// Writes a packed repeated uint64 field.
    pub fn write_packed_uint64(&mut self, number: u32, values: &[u64]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::new();
        for v in values {
            payload.write_varint(*v);
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    /// Writes a packed repeated float field (fixed32 elements).
    pub fn write_packed_float(&mut self, number: u32, values: &[f32]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::with_capacity(values.len() * 4);
        for v in values {
            payload.write_fixed32(v.to_bits());
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    /// Writes a packed repeated double field (fixed64 elements).
    pub fn write_packed_double(&mut self, number: u32, values: &[f64]) -> Result<(), EncodeError> {
        if values.is_empty() {
            return Ok(());
        }
        let mut payload = Writer::with_capacity(values.len() * 8);
        for v in values {
            payload.write_fixed64(v.to_bits());
        }
        self.len_delimited_field(number, payload.as_bytes())
    }

    // === Unpacked repeated fields ===
    //
    // Strings, bytes, and messages are never packed: one independent
    // tag + length-delimited payload per element.

    pub fn write_string_list(&mut self, number: u32, values: &[&str]) -> Result<(), EncodeError> {
        for v in values {
            self.write_string(number, v)?;
        }
        Ok(())
    }

    pub fn write_bytes_list(&mut self, number: u32, values: &[&[u8]]) -> Result<(), EncodeError> {
        for v in values {
            self.write_bytes(number, v)?;
        }
        Ok(())
    }

    pub fn write_message_list<M: Message>(
        &mut self,
        number: u32,
        values: &[M],
    ) -> Result<(), EncodeError> {
        for v in values {
            self.write_message(number, v)?;
        }
        Ok(())
    }

    // === Nested messages ===

    /// Writes a nested message: the child is encoded into a fresh buffer,
    /// then emitted as a single length-delimited field under this tag.
    pub fn write_message<M: Message>(
        &mut self,
        number: u32,
        message: &M,
    ) -> Result<(), EncodeError> {
        let mut child = Writer::new();
        let mut writer = MessageWriter {
            out: &mut child,
            width: self.width,
        };
        message.encode_fields(&mut writer)?;
        self.len_delimited_field(number, child.as_bytes())
    }

    // === Dynamic values ===

    /// Writes a [`WireValue`]: one switch over the closed union.
    pub fn write_value(&mut self, number: u32, value: &WireValue<'_>) -> Result<(), EncodeError> {
        match value {
            WireValue::Bool(v) => self.write_bool(number, *v),
            WireValue::Int32(v) => self.write_int32(number, *v),
            WireValue::Int64(v) => self.write_int64(number, *v),
            WireValue::UInt32(v) => self.write_uint32(number, *v),
            WireValue::UInt64(v) => self.write_uint64(number, *v),
            WireValue::Float(v) => self.write_float(number, *v),
            WireValue::Double(v) => self.write_double(number, *v),
            WireValue::Str(v) => self.write_string(number, v),
            WireValue::Bytes(v) => self.write_bytes(number, v),
            WireValue::Record(fields) => {
                let mut child = Writer::new();
                let mut writer = MessageWriter {
                    out: &mut child,
                    width: self.width,
                };
                for (child_number, child_value) in fields {
                    writer.write_value(*child_number, child_value)?;
                }
                self.len_delimited_field(number, child.as_bytes())
            }
            WireValue::Repeated(items) => {
                if items.is_empty() {
                    return Ok(());
                }
                match packed_payload(items) {
                    Some(payload) => self.len_delimited_field(number, payload.as_bytes()),
                    None => {
                        for item in items {
                            self.write_value(number, item)?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }
}

/// Concatenates numeric scalar element encodings into one packed payload.
///
/// Returns None if any element is not a numeric scalar, in which case the
/// field must be emitted one occurrence per element.
fn packed_payload(items: &[WireValue<'_>]) -> Option<Writer> {
    let mut payload = Writer::new();
    for item in items {
        match item {
            WireValue::Bool(v) => payload.write_varint(*v as u64),
            WireValue::Int32(v) => payload.write_varint(int32_to_wire(*v)),
            WireValue::Int64(v) => payload.write_varint(int64_to_wire(*v)),
            WireValue::UInt32(v) => payload.write_varint(*v as u64),
            WireValue::UInt64(v) => payload.write_varint(*v),
            WireValue::Float(v) => payload.write_fixed32(v.to_bits()),
            WireValue::Double(v) => payload.write_fixed64(v.to_bits()),
            _ => return None,
        }
    }
    Some(payload)
}
