//! Data model types for the wire format.
//!
//! - Tags (field number + wire type)
//! - The closed value union and decode shapes
//! - The integer-width strategy

pub mod tag;
pub mod value;
pub mod width;

pub use tag::{FieldTag, WireType};
pub use value::{Record, Shape, WireValue};
pub use width::{IntWidth, ResolvedWidth};
