use thiserror::Error;
use tonic::Status;

use crate::codec::AttributeType;

/// Convenience result type.
pub type CodecResult<T> = Result<T, CodecError>;

/// Every way building, decoding or encoding channel rows can fail.
///
/// All of these are raised synchronously where they occur. A failed row
/// aborts the whole call, so a successful decode always yields exactly the
/// declared number of rows.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("unsupported attribute type: {0}")]
    UnsupportedType(String),
    #[error("no type is known for attribute {0}")]
    UnknownAttribute(String),
    #[error("attribute {0} is configured more than once")]
    DuplicateAttribute(String),
    #[error("at least one attribute must be configured")]
    NoAttributes,
    #[error("string slots must be at least one byte")]
    EmptyStringSlot,
    #[error("buffer of {len} bytes does not hold {rows} rows of {row_width} bytes")]
    TruncatedBuffer {
        len: usize,
        rows: usize,
        row_width: usize,
    },
    #[error("row count {0} out of range")]
    InvalidRowCount(i64),
    #[error("cannot bind field {field}: {reason}")]
    FieldBinding { field: String, reason: String },
    #[error("record has no field {0}")]
    MissingField(String),
    #[error("{attribute_type} value does not fit its slot: {detail}")]
    EncodingOverflow {
        attribute_type: AttributeType,
        detail: String,
    },
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: AttributeType,
        found: AttributeType,
    },
    #[error("malformed {attribute_type} bytes: {detail}")]
    Malformed {
        attribute_type: AttributeType,
        detail: String,
    },
}

impl From<CodecError> for Status {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Malformed { .. }
            | CodecError::TruncatedBuffer { .. }
            | CodecError::InvalidRowCount(_) => Status::internal(error.to_string()),
            _ => Status::invalid_argument(error.to_string()),
        }
    }
}
