//! Primitive encoding/decoding for the proto3 wire format.
//!
//! Implements varints, fixed-width values, length-delimited payloads, and
//! tag framing.

use crate::error::DecodeError;
use crate::limits::MAX_VARINT_BYTES;
use crate::model::FieldTag;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading wire primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        if self.pos >= self.data.len() {
            return Err(DecodeError::Truncated { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        if n > self.data.len() - self.pos {
            return Err(DecodeError::Truncated { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads an unsigned varint.
    ///
    /// Each byte contributes 7 payload bits at increasing significance;
    /// the MSB is the continuation bit. Rejects sequences longer than 10
    /// bytes and 10-byte sequences carrying bits beyond the 64th.
    #[inline]
    pub fn read_varint(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let mut result: u64 = 0;
        let mut shift = 0;

        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_byte(context)?;
            let value = (byte & 0x7F) as u64;

            // The 10th byte holds bit 63 only
            if shift == 63 && value > 1 {
                return Err(DecodeError::VarintOverflow);
            }

            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;

            if i == MAX_VARINT_BYTES - 1 {
                return Err(DecodeError::VarintTooLong);
            }
        }

        Err(DecodeError::VarintTooLong)
    }

    /// Reads a little-endian fixed32 value.
    #[inline]
    pub fn read_fixed32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4, context)?;
        // SAFETY: read_bytes guarantees exactly 4 bytes, try_into always succeeds
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a little-endian fixed64 value.
    #[inline]
    pub fn read_fixed64(&mut self, context: &'static str) -> Result<u64, DecodeError> {
        let bytes = self.read_bytes(8, context)?;
        // SAFETY: read_bytes guarantees exactly 8 bytes, try_into always succeeds
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a length-delimited payload: a varint length prefix followed
    /// by exactly that many bytes (zero-copy).
    pub fn read_len_prefixed(&mut self, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let len = self.read_varint(context)?;
        if len > self.remaining_len() as u64 {
            return Err(DecodeError::Truncated { context });
        }
        self.read_bytes(len as usize, context)
    }

    /// Reads a length-delimited UTF-8 string (zero-copy).
    pub fn read_str(&mut self, field: &'static str) -> Result<&'a str, DecodeError> {
        let bytes = self.read_len_prefixed(field)?;
        std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field })
    }

    /// Reads and decomposes a field tag.
    pub fn read_tag(&mut self) -> Result<FieldTag, DecodeError> {
        let raw = self.read_varint("tag")?;
        FieldTag::decompose(raw)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
///
/// An append-only owned buffer, exclusively owned by one encode session.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned varint, always in its minimal encoding.
    #[inline]
    pub fn write_varint(&mut self, mut value: u64) {
        // Stack buffer batches the write (faster than repeated push calls)
        let mut buf = [0u8; MAX_VARINT_BYTES];
        let mut len = 0;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf[len] = byte;
            len += 1;
            if value == 0 {
                break;
            }
        }
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a little-endian fixed32 value.
    #[inline]
    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian fixed64 value.
    #[inline]
    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length-delimited payload.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as u64);
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a field tag.
    pub fn write_tag(&mut self, tag: FieldTag) {
        self.write_varint(tag.encoded());
    }
}

/// Varint-encodes a signed 64-bit value by reinterpreting its
/// two's-complement bit pattern as unsigned.
///
/// This matches proto3 `int64` semantics. There is no zigzag transform,
/// so negative values always occupy 10 bytes.
#[inline]
pub fn int64_to_wire(value: i64) -> u64 {
    value as u64
}

/// Varint-encodes a signed 32-bit value: sign-extended to 64 bits first,
/// then reinterpreted as unsigned (proto3 `int32` semantics).
#[inline]
pub fn int32_to_wire(value: i32) -> u64 {
    value as i64 as u64
}
