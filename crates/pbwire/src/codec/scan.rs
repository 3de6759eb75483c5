//! Single-pass message scanner.
//!
//! Splits a message buffer into raw field occurrences and indexes them by
//! field number, preserving stream order. The index is built once per
//! decode and is read-only thereafter.

use rustc_hash::FxHashMap;

use crate::codec::primitives::Reader;
use crate::error::DecodeError;
use crate::model::WireType;

/// One decoded field occurrence: tag plus the payload span into the
/// owning buffer.
///
/// For length-delimited fields the span covers the payload only; the
/// length prefix is already consumed. For varint fields it covers the
/// varint bytes themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField {
    pub number: u32,
    pub wire_type: WireType,
    offset: usize,
    len: usize,
}

/// An ordered, field-number-indexed collection of raw field spans.
///
/// Borrows the scanned buffer; payload bytes are never copied here.
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct FieldIndex<'a> {
    buf: &'a [u8],
    entries: Vec<RawField>,
    by_number: FxHashMap<u32, Vec<usize>>,
}

impl<'a> FieldIndex<'a> {
    /// Scans a message buffer in one forward pass.
    ///
    /// Reads a tag, dispatches on the wire type to find the payload span,
    /// records the occurrence, and advances past the payload until the
    /// buffer is exhausted. Group wire types abort the scan; any short
    /// read is `Truncated`.
    pub fn scan(buf: &'a [u8]) -> Result<FieldIndex<'a>, DecodeError> {
        let mut reader = Reader::new(buf);
        let mut entries = Vec::new();
        let mut by_number: FxHashMap<u32, Vec<usize>> = FxHashMap::default();

        while !reader.is_empty() {
            let tag = reader.read_tag()?;
            let (offset, len) = match tag.wire_type {
                WireType::Varint => {
                    let start = reader.position();
                    reader.read_varint("varint field")?;
                    (start, reader.position() - start)
                }
                WireType::Fixed64 => {
                    let start = reader.position();
                    reader.read_bytes(8, "fixed64 field")?;
                    (start, 8)
                }
                WireType::Fixed32 => {
                    let start = reader.position();
                    reader.read_bytes(4, "fixed32 field")?;
                    (start, 4)
                }
                WireType::LengthDelimited => {
                    let payload = reader.read_len_prefixed("length-delimited field")?;
                    (reader.position() - payload.len(), payload.len())
                }
            };

            let index = entries.len();
            entries.push(RawField {
                number: tag.number,
                wire_type: tag.wire_type,
                offset,
                len,
            });
            by_number.entry(tag.number).or_default().push(index);
        }

        Ok(FieldIndex {
            buf,
            entries,
            by_number,
        })
    }

    /// Returns the payload bytes of an occurrence.
    #[inline]
    pub fn bytes(&self, raw: &RawField) -> &'a [u8] {
        &self.buf[raw.offset..raw.offset + raw.len]
    }

    /// Returns the last occurrence of a field number, if present.
    ///
    /// Proto3 semantics: duplicate singular fields resolve to the last
    /// value on the wire.
    pub fn last(&self, number: u32) -> Option<&RawField> {
        let indices = self.by_number.get(&number)?;
        indices.last().map(|&i| &self.entries[i])
    }

    /// Returns all occurrences of a field number in stream order.
    pub fn all(&self, number: u32) -> impl Iterator<Item = &RawField> {
        self.by_number
            .get(&number)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
    }

    /// Iterates every occurrence in original stream order, ignoring
    /// field-number grouping.
    pub fn iter(&self) -> impl Iterator<Item = &RawField> {
        self.entries.iter()
    }

    /// Returns true if the field number appears at least once.
    pub fn contains(&self, number: u32) -> bool {
        self.by_number.contains_key(&number)
    }

    /// Returns the number of occurrences in the message.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the message has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::primitives::Writer;
    use crate::model::FieldTag;

    fn tag(number: u32, wire_type: WireType) -> FieldTag {
        FieldTag::new(number, wire_type).unwrap()
    }

    #[test]
    fn test_scan_mixed_fields() {
        let mut w = Writer::new();
        w.write_tag(tag(1, WireType::Varint));
        w.write_varint(150);
        w.write_tag(tag(2, WireType::LengthDelimited));
        w.write_len_prefixed(b"testing");
        w.write_tag(tag(3, WireType::Fixed32));
        w.write_fixed32(7);
        w.write_tag(tag(4, WireType::Fixed64));
        w.write_fixed64(9);

        let index = FieldIndex::scan(w.as_bytes()).unwrap();
        assert_eq!(index.len(), 4);

        let f1 = index.last(1).unwrap();
        assert_eq!(f1.wire_type, WireType::Varint);
        assert_eq!(index.bytes(f1), &[0x96, 0x01]); // varint 150

        let f2 = index.last(2).unwrap();
        assert_eq!(index.bytes(f2), b"testing");

        assert_eq!(index.bytes(index.last(3).unwrap()).len(), 4);
        assert_eq!(index.bytes(index.last(4).unwrap()).len(), 8);
        assert!(!index.contains(5));
    }

    #[test]
    fn test_scan_preserves_stream_order() {
        let mut w = Writer::new();
        for (number, v) in [(2u32, 10u64), (1, 20), (2, 30)] {
            w.write_tag(tag(number, WireType::Varint));
            w.write_varint(v);
        }

        let index = FieldIndex::scan(w.as_bytes()).unwrap();
        let order: Vec<u32> = index.iter().map(|f| f.number).collect();
        assert_eq!(order, vec![2, 1, 2]);

        // Keyed lookup keeps per-number insertion order
        let twos: Vec<&[u8]> = index.all(2).map(|f| index.bytes(f)).collect();
        assert_eq!(twos, vec![&[10u8][..], &[30u8][..]]);

        // Last one wins for singular reads
        assert_eq!(index.bytes(index.last(2).unwrap()), &[30]);
    }

    #[test]
    fn test_scan_rejects_groups() {
        // Tag: field 1, start-group (code 3)
        let data = [(1 << 3) | 3u8];
        let result = FieldIndex::scan(&data);
        assert!(matches!(
            result,
            Err(DecodeError::UnsupportedWireType { code: 3 })
        ));
    }

    #[test]
    fn test_scan_rejects_unknown_wire_type() {
        let data = [(1 << 3) | 6u8];
        let result = FieldIndex::scan(&data);
        assert!(matches!(
            result,
            Err(DecodeError::UnknownWireType { code: 6 })
        ));
    }

    #[test]
    fn test_scan_rejects_field_number_zero() {
        // Tag varint 0x02: field number 0, length-delimited
        let data = [0x02, 0x00];
        let result = FieldIndex::scan(&data);
        assert!(matches!(
            result,
            Err(DecodeError::InvalidFieldNumber { number: 0 })
        ));
    }

    #[test]
    fn test_scan_truncated_fixed() {
        let mut w = Writer::new();
        w.write_tag(tag(1, WireType::Fixed64));
        w.write_bytes(&[1, 2, 3]); // 5 bytes short

        let result = FieldIndex::scan(w.as_bytes());
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_scan_truncated_length_delimited() {
        let mut w = Writer::new();
        w.write_tag(tag(1, WireType::LengthDelimited));
        w.write_varint(1000); // declared length far beyond the buffer
        w.write_bytes(b"abc");

        let result = FieldIndex::scan(w.as_bytes());
        assert!(matches!(result, Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_scan_empty_buffer() {
        let index = FieldIndex::scan(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.last(1).is_none());
    }
}
