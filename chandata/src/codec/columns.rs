use std::collections::HashSet;

use crate::{
    codec::{
        descriptor::AttributeDescriptor,
        layout::{AttributeLayout, LayoutTable},
    },
    error::{CodecError, CodecResult},
    record::RecordSchema,
};

/// One attribute's place in a row and the record field it is bound to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Column {
    pub layout: AttributeLayout,
    pub offset: usize,
    pub field: usize,
}

impl Column {
    #[inline]
    pub fn slot<'a>(&self, row: &'a [u8]) -> &'a [u8] {
        &row[self.offset..self.offset + self.layout.width]
    }

    #[inline]
    pub fn slot_mut<'a>(&self, row: &'a mut [u8]) -> &'a mut [u8] {
        &mut row[self.offset..self.offset + self.layout.width]
    }
}

/// The resolved byte layout of a row: every column at its offset, in
/// descriptor order.
#[derive(Debug, Clone)]
pub(crate) struct RowPlan {
    columns: Vec<Column>,
    row_width: usize,
}

impl RowPlan {
    /// Lay out `descriptors` back to back and bind each to a field of
    /// `schema`. `unbound` builds the error for a field the schema lacks.
    /// `descriptors` must not be empty.
    pub fn new<R>(
        descriptors: &[AttributeDescriptor],
        table: &LayoutTable,
        schema: &RecordSchema<R>,
        unbound: fn(&AttributeDescriptor) -> CodecError,
    ) -> CodecResult<Self> {
        if descriptors.is_empty() {
            return Err(CodecError::NoAttributes);
        }
        let mut seen = HashSet::with_capacity(descriptors.len());
        let mut columns = Vec::with_capacity(descriptors.len());
        let mut offset = 0;

        for descriptor in descriptors {
            if !seen.insert(descriptor.name.as_str()) {
                return Err(CodecError::DuplicateAttribute(descriptor.name.clone()));
            }
            let field = schema
                .position(descriptor.field_name())
                .ok_or_else(|| unbound(descriptor))?;
            let field_type = schema.attribute_type(field);
            if field_type != descriptor.attribute_type {
                return Err(CodecError::FieldBinding {
                    field: descriptor.field_name().to_string(),
                    reason: format!(
                        "field is {} but attribute {} is {}",
                        field_type, descriptor.name, descriptor.attribute_type
                    ),
                });
            }
            let layout = table.layout(descriptor.attribute_type);
            columns.push(Column {
                layout,
                offset,
                field,
            });
            offset += layout.width;
        }

        Ok(Self {
            columns,
            row_width: offset,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// The exact buffer length `rows` rows occupy.
    pub fn buffer_len(&self, rows: usize) -> Option<usize> {
        rows.checked_mul(self.row_width)
    }

    /// Check a buffer holds exactly `rows` rows.
    pub fn check_len(&self, len: usize, rows: usize) -> CodecResult<()> {
        match self.buffer_len(rows) {
            Some(expected) if expected == len => Ok(()),
            _ => Err(CodecError::TruncatedBuffer {
                len,
                rows,
                row_width: self.row_width,
            }),
        }
    }

    /// The bytes of row `index`. The buffer length must have been checked.
    #[inline]
    pub fn row<'a>(&self, buf: &'a [u8], index: usize) -> &'a [u8] {
        let start = index * self.row_width;
        &buf[start..start + self.row_width]
    }
}
