use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::{
    codec::{
        columns::RowPlan,
        descriptor::AttributeDescriptor,
        layout::{LayoutTable, DEFAULT_LAYOUT},
    },
    error::{CodecError, CodecResult},
    proto::channels::{channel_data_event::ChannelData, ChannelDataEvent, DataEventType},
    record::{ChannelRecord, RecordSchema},
};

/// A packed buffer of rows and how many rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRows {
    pub data: Bytes,
    pub count: usize,
}

/// Encodes records of type `R` in to packed rows.
///
/// Holds no state between calls, so one encoder can be shared between
/// tasks.
#[derive(Debug)]
pub struct ChannelEncoder<R> {
    descriptors: Vec<AttributeDescriptor>,
    plan: RowPlan,
    schema: RecordSchema<R>,
}

impl<R: ChannelRecord> ChannelEncoder<R> {
    pub fn new(descriptors: Vec<AttributeDescriptor>) -> CodecResult<Self> {
        Self::with_layout(descriptors, &DEFAULT_LAYOUT)
    }

    pub fn with_layout(
        descriptors: Vec<AttributeDescriptor>,
        table: &LayoutTable,
    ) -> CodecResult<Self> {
        let schema = R::schema();
        let plan = RowPlan::new(&descriptors, table, &schema, |d| {
            CodecError::MissingField(d.field_name().to_string())
        })?;
        debug!(
            "Encoder bound {} attributes, row width {}",
            descriptors.len(),
            plan.row_width()
        );
        Ok(Self {
            descriptors,
            plan,
            schema,
        })
    }

    /// Encode `records` in to a new buffer.
    pub fn encode<'r, I>(&self, records: I) -> CodecResult<EncodedRows>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        let mut buf = BytesMut::new();
        let count = self.encode_into(records, &mut buf)?;
        Ok(EncodedRows {
            data: buf.freeze(),
            count,
        })
    }

    /// Append `records` to `dst`, returning the number of rows written. On
    /// failure `dst` is left as it was.
    pub fn encode_into<'r, I>(&self, records: I, dst: &mut BytesMut) -> CodecResult<usize>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        let records = records.into_iter();
        let start = dst.len();
        let width = self.plan.row_width();
        dst.reserve(records.size_hint().0.saturating_mul(width));

        let mut count = 0;
        for record in records {
            let row_start = dst.len();
            dst.resize(row_start + width, 0);
            if let Err(e) = self.encode_row(record, &mut dst[row_start..]) {
                warn!("Row {} failed to encode: {}", count, e);
                dst.truncate(start);
                return Err(e);
            }
            count += 1;
        }
        trace!("Encoded {} rows", count);
        Ok(count)
    }

    /// Encode `records` as an [DataEventType::Add] event, ready to be
    /// written to a channel.
    pub fn write_event<'r, I>(&self, records: I) -> CodecResult<ChannelDataEvent>
    where
        I: IntoIterator<Item = &'r R>,
        R: 'r,
    {
        let EncodedRows { data, count } = self.encode(records)?;
        let count =
            i32::try_from(count).map_err(|_| CodecError::InvalidRowCount(count as i64))?;
        Ok(ChannelDataEvent {
            event: DataEventType::Add as i32,
            data: Some(ChannelData { count, data }),
        })
    }

    fn encode_row(&self, record: &R, row: &mut [u8]) -> CodecResult<()> {
        for column in self.plan.columns() {
            let value = self.schema.get(column.field, record);
            column.layout.encode(&value, column.slot_mut(row))?;
        }
        Ok(())
    }
}

impl<R> ChannelEncoder<R> {
    /// Bytes per row.
    pub fn row_width(&self) -> usize {
        self.plan.row_width()
    }

    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::codec::{layout::ticks_from_datetime, AttributeType};

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

    #[derive(Debug, Default)]
    struct Tagged {
        tag: String,
        value: f64,
    }

    impl ChannelRecord for Tagged {
        fn schema() -> RecordSchema<Self> {
            RecordSchema::new()
                .field("Tag", |r: &Self| r.tag.clone(), |r, v| r.tag = v)
                .field("Value", |r: &Self| r.value, |r, v| r.value = v)
        }
    }

    fn encoder() -> ChannelEncoder<TimeSeries> {
        ChannelEncoder::new(vec![
            AttributeDescriptor::new("DateTime", AttributeType::DateTime),
            AttributeDescriptor::new("Value", AttributeType::Double),
        ])
        .unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn single_row_layout() {
        let encoded = encoder()
            .encode(&[TimeSeries {
                date_time: t0(),
                value: 9.0,
            }])
            .unwrap();
        assert_eq!(encoded.count, 1);
        assert_eq!(encoded.data.len(), 16);
        assert_eq!(
            &encoded.data[..8],
            &ticks_from_datetime(&t0()).unwrap().to_le_bytes()
        );
        assert_eq!(&encoded.data[8..], &9.0f64.to_le_bytes());
    }

    #[test]
    fn empty_input() {
        let encoded = encoder().encode(&[]).unwrap();
        assert_eq!(encoded.count, 0);
        assert!(encoded.data.is_empty());
    }

    #[test]
    fn missing_field() {
        let err = ChannelEncoder::<TimeSeries>::new(vec![AttributeDescriptor::new(
            "TripledValue",
            AttributeType::Double,
        )])
        .unwrap_err();
        assert_eq!(err, CodecError::MissingField("TripledValue".into()));
    }

    #[test]
    fn no_attributes() {
        assert_eq!(
            ChannelEncoder::<TimeSeries>::new(vec![]).unwrap_err(),
            CodecError::NoAttributes
        );
    }

    #[test]
    fn overflow_leaves_buffer_untouched() {
        let encoder = ChannelEncoder::<Tagged>::with_layout(
            vec![
                AttributeDescriptor::new("Tag", AttributeType::String),
                AttributeDescriptor::new("Value", AttributeType::Double),
            ],
            &LayoutTable::new(4),
        )
        .unwrap();
        assert_eq!(encoder.row_width(), 12);

        let mut buf = BytesMut::from(&b"prefix"[..]);
        let records = [
            Tagged {
                tag: "ok".into(),
                value: 1.0,
            },
            Tagged {
                tag: "too long".into(),
                value: 2.0,
            },
        ];
        let err = encoder.encode_into(&records, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::EncodingOverflow { .. }));
        assert_eq!(buf.as_ref(), b"prefix");

        let count = encoder.encode_into(&records[..1], &mut buf).unwrap();
        assert_eq!(count, 1);
        assert_eq!(&buf[6..], b"ok\0\0\0\0\0\0\0\0\xf0\x3f");
    }

    #[test]
    fn event() {
        let event = encoder()
            .write_event(&[
                TimeSeries {
                    date_time: t0(),
                    value: 1.0,
                },
                TimeSeries {
                    date_time: t0(),
                    value: 2.0,
                },
            ])
            .unwrap();
        assert_eq!(event.event, DataEventType::Add as i32);
        let data = event.data.unwrap();
        assert_eq!(data.count, 2);
        assert_eq!(data.data.len(), 32);
    }
}
