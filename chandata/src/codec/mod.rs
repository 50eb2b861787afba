//! A positional codec for channel rows.
//!
//! Every row is the concatenation of one fixed-width slot per configured
//! attribute, in the order the attributes were configured, and a buffer is
//! `count` such rows back to back with no header or separator. Only the
//! row count travels alongside the buffer, so the attribute list is the
//! whole schema: decoder and encoder must be built from the same one.
//!
//! ```text
//! | DateTime (8) | TripledValue (8) | DateTime (8) | TripledValue (8) | ...
//! |<----------- row 0 ------------->|<----------- row 1 ------------->|
//! ```

mod columns;
mod decoder;
mod descriptor;
mod encoder;
mod layout;
mod value;

pub use decoder::{ChannelDecoder, Rows};
pub use descriptor::{resolve_options, AttributeDescriptor};
pub use encoder::{ChannelEncoder, EncodedRows};
pub use layout::{
    datetime_from_ticks, ticks_from_datetime, AttributeLayout, LayoutTable, DEFAULT_LAYOUT,
};
pub use value::{AttributeType, FieldValue, Value};
