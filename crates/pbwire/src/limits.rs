//! Security limits for decoding untrusted input.

/// Maximum number of bytes in a varint encoding a 64-bit value.
pub const MAX_VARINT_BYTES: usize = 10;

/// Largest field number representable in a tag (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Maximum nesting depth for embedded messages.
///
/// Bounds stack usage when decoding adversarial input: each level of
/// nesting costs one recursive scan over the sub-span.
pub const MAX_NESTING_DEPTH: usize = 100;
