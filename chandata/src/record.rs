//! Binding channel attributes to the fields of a Rust type.
//!
//! Rather than looking fields up by name for every row, a type describes
//! its fields once in a [RecordSchema]: a name, the native type, and plain
//! getter and setter functions. Decoders and encoders resolve attribute
//! names against the schema when they are built and only use field indices
//! afterwards.
//!
//! ```
//! use chandata::{ChannelRecord, RecordSchema};
//! use chrono::{DateTime, Utc};
//!
//! #[derive(Debug, Default)]
//! struct TimeSeries {
//!     date_time: DateTime<Utc>,
//!     value: f64,
//! }
//!
//! impl ChannelRecord for TimeSeries {
//!     fn schema() -> RecordSchema<Self> {
//!         RecordSchema::new()
//!             .field("DateTime", |r: &Self| r.date_time, |r, v| r.date_time = v)
//!             .field("Value", |r: &Self| r.value, |r, v| r.value = v)
//!     }
//! }
//!
//! assert_eq!(TimeSeries::schema().len(), 2);
//! ```

use std::fmt::{Debug, Formatter};

use crate::{
    codec::{AttributeType, FieldValue, Value},
    error::CodecResult,
};

/// A type rows can be decoded in to and encoded from.
pub trait ChannelRecord: Default + Sized {
    fn schema() -> RecordSchema<Self>;
}

type Getter<R> = Box<dyn Fn(&R) -> Value + Send + Sync>;
type Setter<R> = Box<dyn Fn(&mut R, Value) -> CodecResult<()> + Send + Sync>;

struct FieldAccessor<R> {
    name: String,
    attribute_type: AttributeType,
    get: Getter<R>,
    set: Setter<R>,
}

/// The named fields of a record type.
pub struct RecordSchema<R> {
    fields: Vec<FieldAccessor<R>>,
}

impl<R> Default for RecordSchema<R> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<R> Debug for RecordSchema<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|a| (&a.name, a.attribute_type)))
            .finish()
    }
}

impl<R: 'static> RecordSchema<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. The attribute type it binds to follows from `T`.
    pub fn field<T: FieldValue + 'static>(
        mut self,
        name: impl Into<String>,
        get: fn(&R) -> T,
        set: fn(&mut R, T),
    ) -> Self {
        self.fields.push(FieldAccessor {
            name: name.into(),
            attribute_type: T::ATTRIBUTE_TYPE,
            get: Box::new(move |record: &R| get(record).into()),
            set: Box::new(move |record: &mut R, value: Value| {
                set(record, T::try_from(value)?);
                Ok(())
            }),
        });
        self
    }
}

impl<R> RecordSchema<R> {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the first field called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn name(&self, field: usize) -> &str {
        &self.fields[field].name
    }

    pub fn attribute_type(&self, field: usize) -> AttributeType {
        self.fields[field].attribute_type
    }

    #[inline]
    pub(crate) fn get(&self, field: usize, record: &R) -> Value {
        (self.fields[field].get)(record)
    }

    #[inline]
    pub(crate) fn set(&self, field: usize, record: &mut R, value: Value) -> CodecResult<()> {
        (self.fields[field].set)(record, value)
    }
}
