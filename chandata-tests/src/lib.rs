//! Record types shared by the integration tests.

use chandata::{AttributeDescriptor, AttributeType, ChannelRecord, RecordSchema};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// What a module writes to its output channel.
#[derive(Debug, Default, Clone, PartialEq)]
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

/// A reading with a free-text label.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LabelledReading {
    pub label: String,
    pub taken_at: DateTime<Utc>,
    pub reading: f64,
}

impl ChannelRecord for LabelledReading {
    fn schema() -> RecordSchema<Self> {
        RecordSchema::new()
            .field("label", |r: &Self| r.label.clone(), |r, v| r.label = v)
            .field("taken_at", |r: &Self| r.taken_at, |r, v| r.taken_at = v)
            .field("reading", |r: &Self| r.reading, |r, v| r.reading = v)
    }
}

pub fn tripled_attributes() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::new("DateTime", AttributeType::DateTime),
        AttributeDescriptor::new("TripledValue", AttributeType::Double),
    ]
}

/// Wire names differ from field names; the order differs from the struct.
pub fn labelled_attributes() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::new("Reading", AttributeType::Double).named_as("reading"),
        AttributeDescriptor::new("Label", AttributeType::String).named_as("label"),
        AttributeDescriptor::new("TakenAt", AttributeType::DateTime).named_as("taken_at"),
    ]
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 11, 5, 9, 30, 0).unwrap()
}

/// `n` rows a millisecond apart, each three times its index.
pub fn tripled_series(n: usize) -> Vec<TripledTimeSeries> {
    (0..n)
        .map(|i| TripledTimeSeries {
            date_time: t0() + Duration::milliseconds(i as i64),
            tripled_value: 3.0 * i as f64,
        })
        .collect()
}
