use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Utc};

use crate::error::CodecError;

/// The attribute types a channel column can be declared with. The names
/// match the `attribute_type_name` strings used on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeType {
    String,
    Double,
    DateTime,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "String",
            AttributeType::Double => "Double",
            AttributeType::DateTime => "DateTime",
        }
    }
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(AttributeType::String),
            "Double" => Ok(AttributeType::Double),
            "DateTime" => Ok(AttributeType::DateTime),
            other => Err(CodecError::UnsupportedType(other.to_string())),
        }
    }
}

/// A single decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Double(f64),
    DateTime(DateTime<Utc>),
}

impl Value {
    /// The attribute type this value encodes as.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Value::String(_) => AttributeType::String,
            Value::Double(_) => AttributeType::Double,
            Value::DateTime(_) => AttributeType::DateTime,
        }
    }
}

/// A native Rust type which can be bound to a channel attribute.
pub trait FieldValue: Into<Value> + TryFrom<Value, Error = CodecError> {
    /// The only attribute type this native type binds to.
    const ATTRIBUTE_TYPE: AttributeType;
}

macro_rules! field_value {
    ($native:ty, $variant:ident) => {
        impl From<$native> for Value {
            fn from(v: $native) -> Self {
                Value::$variant(v)
            }
        }

        impl TryFrom<Value> for $native {
            type Error = CodecError;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(CodecError::TypeMismatch {
                        expected: AttributeType::$variant,
                        found: other.attribute_type(),
                    }),
                }
            }
        }

        impl FieldValue for $native {
            const ATTRIBUTE_TYPE: AttributeType = AttributeType::$variant;
        }
    };
}

field_value!(String, String);
field_value!(f64, Double);
field_value!(DateTime<Utc>, DateTime);
