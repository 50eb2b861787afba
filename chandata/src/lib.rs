//! # Chandata
//!
//! Chandata converts between strongly typed Rust records and the packed
//! rows a channel service streams over gRPC.
//!
//! A channel is a named, time-ordered collection of rows. Each row holds
//! one value per attribute, every value sits in a fixed-width slot, and
//! rows are sent back to back with nothing but a row count alongside. The
//! same ordered list of attributes drives both directions: a
//! [ChannelDecoder] turns a received buffer in to records, a
//! [ChannelEncoder] turns records in to a buffer to write.
//!
//! ## Getting Started
//!
//! Describe how your record's fields map to attributes by implementing
//! [ChannelRecord], then build a decoder or encoder from the attributes to
//! read or write.
//!
//! ```
//! use chandata::{
//!     AttributeDescriptor, AttributeType, ChannelDecoder, ChannelEncoder, ChannelRecord,
//!     RecordSchema,
//! };
//! use chrono::{DateTime, TimeZone, Utc};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct TripledTimeSeries {
//!     date_time: DateTime<Utc>,
//!     tripled_value: f64,
//! }
//!
//! impl ChannelRecord for TripledTimeSeries {
//!     fn schema() -> RecordSchema<Self> {
//!         RecordSchema::new()
//!             .field("DateTime", |r: &Self| r.date_time, |r, v| r.date_time = v)
//!             .field("TripledValue", |r: &Self| r.tripled_value, |r, v| r.tripled_value = v)
//!     }
//! }
//!
//! # fn main() -> Result<(), chandata::CodecError> {
//! let attributes = vec![
//!     AttributeDescriptor::new("DateTime", AttributeType::DateTime),
//!     AttributeDescriptor::new("TripledValue", AttributeType::Double),
//! ];
//! let encoder = ChannelEncoder::<TripledTimeSeries>::new(attributes.clone())?;
//! let decoder = ChannelDecoder::<TripledTimeSeries>::new(attributes)?;
//!
//! let record = TripledTimeSeries {
//!     date_time: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
//!     tripled_value: 9.0,
//! };
//! let encoded = encoder.encode([&record])?;
//! assert_eq!((encoded.data.len(), encoded.count), (16, 1));
//!
//! let decoded = decoder.read_all(&encoded.data, encoded.count)?;
//! assert_eq!(decoded, vec![record]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Streaming
//!
//! The channel service itself lives behind its own RPC client. The
//! [stream] module adapts its event streams: [stream::decode_events] turns
//! a stream of [ChannelDataEvent](proto::channels::ChannelDataEvent)s in
//! to a stream of decoded rows, and [stream::write_request] packs records
//! in to a write request.
//!
//! ## Wire format
//!
//! See [codec] for the row layout. `String` slots are a fixed number of
//! UTF-8 bytes padded with zeros, configurable through [LayoutTable].

pub mod codec;
pub(crate) mod constants;

mod error;
pub mod proto;
mod record;
pub mod stream;

pub use codec::{
    AttributeDescriptor, AttributeType, ChannelDecoder, ChannelEncoder, EncodedRows, LayoutTable,
    Value,
};
pub use error::{CodecError, CodecResult};
pub use record::{ChannelRecord, RecordSchema};
