use chandata::{
    proto::channels::{ChannelDataEvent, WriteChannelRequest},
    stream::ChannelUpdate,
    AttributeDescriptor, AttributeType, ChannelDecoder, ChannelEncoder, ChannelRecord,
    RecordSchema,
};
use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_distr::Normal;
use tokio::sync::mpsc::Sender;
use tonic::Status;
use tracing::debug;

const MEAN: f64 = 100.0;
const STD_DEV: f64 = 15.0;

/// A row of the `raw` input channel.
#[derive(Debug, Default, Clone)]
pub struct TimeSeries {
    pub date_time: DateTime<Utc>,
    pub value: f64,
}

impl ChannelRecord for TimeSeries {
    fn schema() -> RecordSchema<Self> {
        RecordSchema::new()
            .field("DateTime", |r: &Self| r.date_time, |r, v| r.date_time = v)
            .field("Value", |r: &Self| r.value, |r, v| r.value = v)
    }
}

/// A row of the `multipliedByThree` output channel.
#[derive(Debug, Default, Clone)]
pub struct TripledTimeSeries {
    pub date_time: DateTime<Utc>,
    pub tripled_value: f64,
}

impl ChannelRecord for TripledTimeSeries {
    fn schema() -> RecordSchema<Self> {
        RecordSchema::new()
            .field("DateTime", |r: &Self| r.date_time, |r, v| r.date_time = v)
            .field(
                "TripledValue",
                |r: &Self| r.tripled_value,
                |r, v| r.tripled_value = v,
            )
    }
}

pub fn raw_attributes() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::new("DateTime", AttributeType::DateTime),
        AttributeDescriptor::new("Value", AttributeType::Double),
    ]
}

pub fn tripled_attributes() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::new("DateTime", AttributeType::DateTime),
        AttributeDescriptor::new("TripledValue", AttributeType::Double),
    ]
}

/// For demonstration purposes, a reading drawn around a fixed mean.
pub fn random_reading() -> TimeSeries {
    TimeSeries {
        date_time: Utc::now(),
        value: Normal::new(MEAN, STD_DEV)
            .unwrap()
            .sample(&mut thread_rng()),
    }
}

/// Stands in for the service: every row written to `raw` is tripled and
/// published on the `multipliedByThree` read stream.
pub struct TriplingModule {
    decoder: ChannelDecoder<TimeSeries>,
    encoder: ChannelEncoder<TripledTimeSeries>,
    output: Sender<Result<ChannelDataEvent, Status>>,
}

impl TriplingModule {
    pub fn new(output: Sender<Result<ChannelDataEvent, Status>>) -> Self {
        Self {
            decoder: ChannelDecoder::new(raw_attributes()).unwrap(),
            encoder: ChannelEncoder::new(tripled_attributes()).unwrap(),
            output,
        }
    }

    pub async fn write_channel(&self, request: WriteChannelRequest) -> Result<(), Status> {
        let event = request
            .data
            .ok_or_else(|| Status::invalid_argument("missing data"))?;
        let ChannelUpdate::Added(rows) = self.decoder.decode_event(&event)? else {
            return Ok(());
        };
        debug!("{} rows written to {}", rows.len(), request.channel_name);

        let tripled = rows
            .into_iter()
            .map(|r| TripledTimeSeries {
                date_time: r.date_time,
                tripled_value: r.value * 3.0,
            })
            .collect::<Vec<_>>();
        let event = self.encoder.write_event(&tripled)?;
        self.output
            .send(Ok(event))
            .await
            .map_err(|_| Status::unavailable("read stream closed"))
    }
}
