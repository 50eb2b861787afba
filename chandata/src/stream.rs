//! The boundary with the channel service's RPC streams.
//!
//! The service owns the connection, retries and cancellation. This module
//! only turns the events it delivers in to records, and records in to the
//! requests it accepts.

use std::{pin::Pin, sync::Arc};

use async_stream::stream;
use futures::{pin_mut, Stream, StreamExt};
use tonic::Status;
use tracing::{trace, warn};

use crate::{
    codec::{AttributeDescriptor, ChannelDecoder, ChannelEncoder},
    error::CodecResult,
    proto::channels::{ChannelDataEvent, ReadChannelRequest, WriteChannelRequest},
    record::ChannelRecord,
};

pub type MessageStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// A decoded channel event.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelUpdate<R> {
    /// Rows appended to the channel, in row order.
    Added(Vec<R>),
    /// An event kind this client doesn't handle, by its wire value.
    Other(i32),
}

/// Decode each event of a read stream as it arrives.
///
/// An event which fails to decode is yielded as an error and the stream
/// carries on with the next one; errors from `events` are passed through.
pub fn decode_events<R, S>(
    decoder: Arc<ChannelDecoder<R>>,
    events: S,
) -> impl Stream<Item = Result<ChannelUpdate<R>, Status>>
where
    R: ChannelRecord,
    S: Stream<Item = Result<ChannelDataEvent, Status>>,
{
    stream! {
        pin_mut!(events);
        while let Some(event) = events.next().await {
            let update = event.and_then(|event| {
                decoder.decode_event(&event).map_err(|e| {
                    warn!("Failed to decode channel event: {}", e);
                    Status::from(e)
                })
            });
            if let Ok(ChannelUpdate::Added(rows)) = &update {
                trace!("Received {} rows", rows.len());
            }
            yield update;
        }
    }
}

/// Like [decode_events], boxed.
pub fn boxed_decode_events<R, S>(
    decoder: Arc<ChannelDecoder<R>>,
    events: S,
) -> MessageStream<ChannelUpdate<R>>
where
    R: ChannelRecord + Send + Sync + 'static,
    S: Stream<Item = Result<ChannelDataEvent, Status>> + Send + 'static,
{
    Box::pin(decode_events(decoder, events))
}

/// The request to subscribe to `descriptors` of a channel.
pub fn read_request(
    channel_name: impl Into<String>,
    descriptors: &[AttributeDescriptor],
) -> ReadChannelRequest {
    ReadChannelRequest {
        channel_name: channel_name.into(),
        attributes: descriptors.iter().map(Into::into).collect(),
    }
}

/// The request to append `records` to a channel.
pub fn write_request<'r, R, I>(
    channel_name: impl Into<String>,
    encoder: &ChannelEncoder<R>,
    records: I,
) -> CodecResult<WriteChannelRequest>
where
    R: ChannelRecord + 'r,
    I: IntoIterator<Item = &'r R>,
{
    Ok(WriteChannelRequest {
        channel_name: channel_name.into(),
        data: Some(encoder.write_event(records)?),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use futures::{stream, TryStreamExt};
    use tonic::Code;

    use super::*;
    use crate::{
        codec::AttributeType,
        proto::channels::{channel_data_event::ChannelData, DataEventType},
        record::RecordSchema,
    };

    #[derive(Debug, Default, Clone, PartialEq)]
    struct TimeSeries {
        date_time: DateTime<Utc>,
        value: f64,
    }

    impl ChannelRecord for TimeSeries {
        fn schema() -> RecordSchema<Self> {
            RecordSchema::new()
                .field("DateTime", |r: &Self| r.date_time, |r, v| r.date_time = v)
                .field("Value", |r: &Self| r.value, |r, v| r.value = v)
        }
    }

    fn descriptors() -> Vec<AttributeDescriptor> {
        vec![
            AttributeDescriptor::new("DateTime", AttributeType::DateTime),
            AttributeDescriptor::new("Value", AttributeType::Double),
        ]
    }

    fn series(n: i64) -> Vec<TimeSeries> {
        let t0 = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| TimeSeries {
                date_time: t0 + Duration::milliseconds(i),
                value: i as f64,
            })
            .collect()
    }

    #[test]
    fn requests() {
        let read = read_request("multipliedByThree", &descriptors());
        assert_eq!(read.channel_name, "multipliedByThree");
        assert_eq!(read.attributes.len(), 2);
        assert_eq!(read.attributes[1].name, "Value");

        let encoder = ChannelEncoder::<TimeSeries>::new(descriptors()).unwrap();
        let write = write_request("raw", &encoder, &series(3)).unwrap();
        assert_eq!(write.channel_name, "raw");
        let data = write.data.unwrap().data.unwrap();
        assert_eq!(data.count, 3);
        assert_eq!(data.data.len(), 48);
    }

    #[tokio::test]
    async fn decode_stream() -> anyhow::Result<()> {
        let encoder = ChannelEncoder::<TimeSeries>::new(descriptors())?;
        let decoder = Arc::new(ChannelDecoder::<TimeSeries>::new(descriptors())?);

        let first = series(2);
        let second = series(5);
        let events = stream::iter(vec![
            Ok(encoder.write_event(&first)?),
            Ok(ChannelDataEvent {
                event: 3,
                data: None,
            }),
            Ok(encoder.write_event(&second)?),
        ]);

        let updates: Vec<_> = decode_events(decoder, events).try_collect().await?;
        assert_eq!(
            updates,
            vec![
                ChannelUpdate::Added(first),
                ChannelUpdate::Other(3),
                ChannelUpdate::Added(second),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn errors_do_not_end_stream() -> anyhow::Result<()> {
        let encoder = ChannelEncoder::<TimeSeries>::new(descriptors())?;
        let decoder = Arc::new(ChannelDecoder::<TimeSeries>::new(descriptors())?);

        let truncated = ChannelDataEvent {
            event: DataEventType::Add as i32,
            data: Some(ChannelData {
                count: 1,
                data: vec![0u8; 15].into(),
            }),
        };
        let events = stream::iter(vec![
            Ok(truncated),
            Err(Status::unavailable("gone")),
            Ok(encoder.write_event(&series(1))?),
        ]);

        let updates: Vec<_> = boxed_decode_events(decoder, events).collect().await;
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].as_ref().unwrap_err().code(), Code::Internal);
        assert_eq!(updates[1].as_ref().unwrap_err().code(), Code::Unavailable);
        assert_eq!(
            updates[2].as_ref().unwrap(),
            &ChannelUpdate::Added(series(1))
        );
        Ok(())
    }
}
