//! Error types for wire format encoding and decoding.

use thiserror::Error;

use crate::model::{ResolvedWidth, WireType};

/// Error during binary decoding.
///
/// Any decode failure aborts the entire enclosing call; there is no
/// partial-result recovery. Field absence is not an error and is handled
/// by the reader methods directly (defaults for plain reads, `None` for
/// optional reads).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input while reading {context}")]
    Truncated { context: &'static str },

    #[error("varint exceeds maximum length (10 bytes)")]
    VarintTooLong,

    #[error("varint overflow (value exceeds u64)")]
    VarintOverflow,

    #[error("unknown wire type code: {code}")]
    UnknownWireType { code: u8 },

    #[error("unsupported wire type code {code} (groups are deprecated)")]
    UnsupportedWireType { code: u8 },

    #[error("invalid field number: {number} (must be in [1, 2^29 - 1])")]
    InvalidFieldNumber { number: u64 },

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("field {number}: expected wire type {expected}, found {found}")]
    WireTypeMismatch {
        number: u32,
        expected: WireType,
        found: WireType,
    },

    #[error("field {number}: value does not fit the configured {width} integer width")]
    IntOutOfRange { number: u32, width: ResolvedWidth },

    #[error("message nesting exceeds maximum depth {max}")]
    DepthLimitExceeded { max: usize },
}

/// Error during binary encoding.
///
/// Encoding either fully succeeds or fails; a failed encode never yields
/// partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("invalid field number: {number} (must be in [1, 2^29 - 1])")]
    InvalidFieldNumber { number: u32 },

    #[error("integer value {value} does not fit the configured {width} integer width")]
    IntOutOfRange { value: i128, width: ResolvedWidth },
}
