//! pbwire: schema-less proto3 wire format codec.
//!
//! This crate encodes and decodes the Protocol Buffers proto3 wire format
//! driven entirely by structural field information supplied by the data
//! model — a stable positive field number per field — with no `.proto`
//! schema text involved.
//!
//! # Overview
//!
//! The codec is built for:
//! - **Bit-exact wire compatibility**: varints, fixed32/fixed64,
//!   length-delimited payloads, and tag framing follow proto3 rules,
//!   including packed repeated scalars and last-one-wins duplicates
//! - **Untrusted input**: one bounded scan pass per message, with strict
//!   truncation, wire-type, and nesting-depth checks
//! - **Zero-copy decode**: strings and byte blobs borrow from the input
//!   buffer until a caller asks for owned data
//!
//! # Quick Start
//!
//! ```rust
//! use pbwire::{DecodeError, EncodeError, Message, MessageReader, MessageWriter};
//!
//! #[derive(Debug, PartialEq)]
//! struct Person {
//!     age: i32,
//!     names: Vec<String>,
//! }
//!
//! impl Message for Person {
//!     fn encode_fields(&self, w: &mut MessageWriter<'_>) -> Result<(), EncodeError> {
//!         w.write_int32(1, self.age)?;
//!         let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
//!         w.write_string_list(2, &names)
//!     }
//!
//!     fn decode_fields(r: &MessageReader<'_>) -> Result<Self, DecodeError> {
//!         Ok(Person {
//!             age: r.read_int32(1)?,
//!             names: r.read_string_list(2)?,
//!         })
//!     }
//! }
//!
//! let person = Person {
//!     age: 23,
//!     names: vec!["AAAAA".to_string(), "BBBBB".to_string()],
//! };
//! let bytes = pbwire::encode(&person).unwrap();
//! let decoded: Person = pbwire::decode(&bytes).unwrap();
//! assert_eq!(person, decoded);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Tags, the closed value union, decode shapes, and the
//!   integer-width strategy
//! - [`codec`]: Scanner, encoding/decoding containers, and primitives
//! - [`error`]: Error types
//! - [`limits`]: Security limits for decoding
//!
//! # Semantics
//!
//! - Signed integers use proto3 `int32`/`int64` encoding: the
//!   two's-complement bit pattern varint-encoded directly, no zigzag
//! - A `false` bool is never emitted (proto3 implicit presence); every
//!   other explicitly written value is emitted, including zero and ""
//! - Field absence on decode is never an error: plain reads yield the
//!   type's default, optional reads yield `None`
//! - All failures are synchronous and abort the whole enclosing call;
//!   there is no partial-result recovery

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{
    Decoder, Encoder, FieldIndex, Message, MessageReader, MessageWriter, RawField, decode, encode,
};
pub use error::{DecodeError, EncodeError};
pub use model::{FieldTag, IntWidth, Record, ResolvedWidth, Shape, WireType, WireValue};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
