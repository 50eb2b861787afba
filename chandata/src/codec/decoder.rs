use std::iter::FusedIterator;

use tracing::{debug, trace, warn};

use crate::{
    codec::{
        columns::RowPlan,
        descriptor::{resolve_options, AttributeDescriptor},
        layout::{LayoutTable, DEFAULT_LAYOUT},
    },
    error::{CodecError, CodecResult},
    proto::channels::{
        read_channel_request::AttributeOptions, AttributeParams, ChannelDataEvent, DataEventType,
    },
    record::{ChannelRecord, RecordSchema},
    stream::ChannelUpdate,
};

/// Decodes packed rows in to records of type `R`.
///
/// Built once per read: attribute names are bound to fields of `R` here,
/// so decoding a buffer never looks anything up by name.
#[derive(Debug)]
pub struct ChannelDecoder<R> {
    descriptors: Vec<AttributeDescriptor>,
    plan: RowPlan,
    schema: RecordSchema<R>,
}

impl<R: ChannelRecord> ChannelDecoder<R> {
    pub fn new(descriptors: Vec<AttributeDescriptor>) -> CodecResult<Self> {
        Self::with_layout(descriptors, &DEFAULT_LAYOUT)
    }

    pub fn with_layout(
        descriptors: Vec<AttributeDescriptor>,
        table: &LayoutTable,
    ) -> CodecResult<Self> {
        let schema = R::schema();
        let plan = RowPlan::new(&descriptors, table, &schema, |d| CodecError::FieldBinding {
            field: d.field_name().to_string(),
            reason: format!("no such field for attribute {}", d.name),
        })?;
        debug!(
            "Decoder bound {} attributes, row width {}",
            descriptors.len(),
            plan.row_width()
        );
        Ok(Self {
            descriptors,
            plan,
            schema,
        })
    }

    /// Build a decoder for the attributes of a read request, taking each
    /// attribute's type from the channel's definitions.
    pub fn from_options(
        options: &[AttributeOptions],
        attributes: &[AttributeParams],
    ) -> CodecResult<Self> {
        Self::new(resolve_options(options, attributes)?)
    }

    /// Validate `buf` holds exactly `rows` rows and return a lazy iterator
    /// over them, in order.
    pub fn decode_all<'a>(&'a self, buf: &'a [u8], rows: usize) -> CodecResult<Rows<'a, R>> {
        if let Err(e) = self.plan.check_len(buf.len(), rows) {
            warn!("Rejecting buffer: {}", e);
            return Err(e);
        }
        trace!("Decoding {} rows", rows);
        Ok(Rows {
            decoder: self,
            buf,
            next: 0,
            rows,
        })
    }

    /// Decode every row, failing on the first row which doesn't decode.
    pub fn read_all(&self, buf: &[u8], rows: usize) -> CodecResult<Vec<R>> {
        self.decode_all(buf, rows)?.collect()
    }

    /// Decode the rows carried by a streamed event. Events other than
    /// [DataEventType::Add] are handed back untouched.
    pub fn decode_event(&self, event: &ChannelDataEvent) -> CodecResult<ChannelUpdate<R>> {
        if event.event != DataEventType::Add as i32 {
            return Ok(ChannelUpdate::Other(event.event));
        }
        let Some(data) = event.data.as_ref() else {
            return Ok(ChannelUpdate::Added(Vec::new()));
        };
        let rows =
            usize::try_from(data.count).map_err(|_| CodecError::InvalidRowCount(data.count.into()))?;
        self.read_all(&data.data, rows).map(ChannelUpdate::Added)
    }

    fn decode_row(&self, row: &[u8]) -> CodecResult<R> {
        let mut record = R::default();
        for column in self.plan.columns() {
            let value = column.layout.decode(column.slot(row))?;
            self.schema.set(column.field, &mut record, value)?;
        }
        Ok(record)
    }
}

impl<R> ChannelDecoder<R> {
    /// Bytes per row.
    pub fn row_width(&self) -> usize {
        self.plan.row_width()
    }

    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }
}

/// The rows of one buffer, decoded on demand.
///
/// One-shot: once a row fails to decode, iteration ends.
#[derive(Debug)]
pub struct Rows<'a, R> {
    decoder: &'a ChannelDecoder<R>,
    buf: &'a [u8],
    next: usize,
    rows: usize,
}

impl<'a, R: ChannelRecord> Iterator for Rows<'a, R> {
    type Item = CodecResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.rows {
            return None;
        }
        let index = self.next;
        let row = self.decoder.plan.row(self.buf, index);
        let record = self.decoder.decode_row(row);
        if let Err(e) = &record {
            warn!("Row {} failed to decode: {}", index, e);
            self.next = self.rows;
        } else {
            self.next += 1;
        }
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, R: ChannelRecord> ExactSizeIterator for Rows<'a, R> {}

impl<'a, R: ChannelRecord> FusedIterator for Rows<'a, R> {}
