//! Binary encoding/decoding for the proto3 wire format.

pub mod decode;
pub mod encode;
pub mod primitives;
pub mod scan;

pub use decode::{Decoder, MessageReader};
pub use encode::{Encoder, MessageWriter};
pub use primitives::{Reader, Writer, int32_to_wire, int64_to_wire};
pub use scan::{FieldIndex, RawField};

use crate::error::{DecodeError, EncodeError};

/// A structured value that can enumerate its own fields with stable
/// positive field-number identities.
///
/// The field-number mapping is supplied by the implementor, not by any
/// parsed schema: `encode_fields` calls writer methods with explicit
/// numbers, `decode_fields` reads them back by the same numbers. Field
/// numbers outside [1, 2^29 - 1] are rejected at the writer/reader call,
/// never silently accepted.
pub trait Message: Sized {
    /// Writes this value's fields in the desired wire order.
    fn encode_fields(&self, w: &mut MessageWriter<'_>) -> Result<(), EncodeError>;

    /// Reconstructs a value from the scanned fields of one message.
    fn decode_fields(r: &MessageReader<'_>) -> Result<Self, DecodeError>;
}

/// Encodes a message with the default (native) integer-width strategy.
pub fn encode<M: Message>(message: &M) -> Result<Vec<u8>, EncodeError> {
    Encoder::default().encode(message)
}

/// Decodes a message with the default (native) integer-width strategy.
pub fn decode<M: Message>(input: &[u8]) -> Result<M, DecodeError> {
    Decoder::default().decode(input)
}
