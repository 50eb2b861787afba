/// / Definition of a single attribute of a channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttributeParams {
    /// / The attribute name on the wire.
    #[prost(string, tag="1")]
    pub attribute_name: ::prost::alloc::string::String,
    /// / One of "String", "Double" or "DateTime".
    #[prost(string, tag="2")]
    pub attribute_type_name: ::prost::alloc::string::String,
}
/// / Subscribe to the rows written to a channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadChannelRequest {
    #[prost(string, tag="1")]
    pub channel_name: ::prost::alloc::string::String,
    /// / The attributes to stream, in the order they are laid out in each row.
    #[prost(message, repeated, tag="2")]
    pub attributes: ::prost::alloc::vec::Vec<read_channel_request::AttributeOptions>,
}
/// Nested message and enum types in `ReadChannelRequest`.
pub mod read_channel_request {
    /// / Select an attribute of the channel, optionally renaming it.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AttributeOptions {
        #[prost(string, tag="1")]
        pub name: ::prost::alloc::string::String,
        /// / Empty to keep `name`.
        #[prost(string, tag="2")]
        pub name_as: ::prost::alloc::string::String,
    }
}
/// / A change to the contents of a channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelDataEvent {
    #[prost(enumeration="DataEventType", tag="1")]
    pub event: i32,
    #[prost(message, optional, tag="2")]
    pub data: ::core::option::Option<channel_data_event::ChannelData>,
}
/// Nested message and enum types in `ChannelDataEvent`.
pub mod channel_data_event {
    /// / Packed rows.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ChannelData {
        /// / The number of rows in `data`.
        #[prost(int32, tag="1")]
        pub count: i32,
        /// / `count` fixed-width rows back to back.
        #[prost(bytes="bytes", tag="2")]
        pub data: ::prost::bytes::Bytes,
    }
}
/// / Append rows to a channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteChannelRequest {
    #[prost(string, tag="1")]
    pub channel_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag="2")]
    pub data: ::core::option::Option<ChannelDataEvent>,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataEventType {
    /// / Rows were appended to the channel.
    Add = 0,
}
impl DataEventType {
    /// String value of the enum field names used in the ProtoBuf definition.
    ///
    /// The values are not transformed in any way and thus are considered stable
    /// (if the ProtoBuf definition does not change) and safe for programmatic use.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            DataEventType::Add => "Add",
        }
    }
}
