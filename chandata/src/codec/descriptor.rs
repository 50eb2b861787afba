use std::collections::HashMap;

use crate::{
    codec::value::AttributeType,
    error::{CodecError, CodecResult},
    proto::channels::{read_channel_request::AttributeOptions, AttributeParams},
};

/// Binds one wire attribute to a record field.
///
/// The order of descriptors handed to a decoder or encoder is the byte
/// order of the attributes within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// The attribute name on the wire.
    pub name: String,
    pub attribute_type: AttributeType,
    /// The record field to bind to, when it differs from `name`.
    pub display_name: Option<String>,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            display_name: None,
        }
    }

    /// Like [AttributeDescriptor::new], with the type given by its wire
    /// name.
    pub fn parse(name: impl Into<String>, type_name: &str) -> CodecResult<Self> {
        Ok(Self::new(name, type_name.parse()?))
    }

    /// Bind to the record field `display_name` instead of `name`.
    pub fn named_as(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// The record field this attribute is bound to.
    pub fn field_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl TryFrom<&AttributeParams> for AttributeDescriptor {
    type Error = CodecError;

    fn try_from(params: &AttributeParams) -> Result<Self, Self::Error> {
        Self::parse(params.attribute_name.as_str(), &params.attribute_type_name)
    }
}

impl From<&AttributeDescriptor> for AttributeParams {
    fn from(descriptor: &AttributeDescriptor) -> Self {
        AttributeParams {
            attribute_name: descriptor.name.clone(),
            attribute_type_name: descriptor.attribute_type.as_str().to_string(),
        }
    }
}

impl From<&AttributeDescriptor> for AttributeOptions {
    fn from(descriptor: &AttributeDescriptor) -> Self {
        AttributeOptions {
            name: descriptor.name.clone(),
            name_as: descriptor.display_name.clone().unwrap_or_default(),
        }
    }
}

/// Resolve the attributes of a read request against the definitions of the
/// channel being read. An empty `name_as` means no rename.
pub fn resolve_options(
    options: &[AttributeOptions],
    attributes: &[AttributeParams],
) -> CodecResult<Vec<AttributeDescriptor>> {
    let types = attributes
        .iter()
        .map(|a| (a.attribute_name.as_str(), a.attribute_type_name.as_str()))
        .collect::<HashMap<_, _>>();

    options
        .iter()
        .map(|option| {
            let type_name = types
                .get(option.name.as_str())
                .ok_or_else(|| CodecError::UnknownAttribute(option.name.clone()))?;
            let descriptor = AttributeDescriptor::parse(option.name.as_str(), type_name)?;
            Ok(if option.name_as.is_empty() {
                descriptor
            } else {
                descriptor.named_as(option.name_as.as_str())
            })
        })
        .collect()
}
