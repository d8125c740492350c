mod remote_context;
mod remote_error;
mod remote_tuple;
mod remote_value;
mod wire_codec;
mod wire_error;
mod wire_filter;
mod wire_param;
mod wire_type_tag;
mod wire_value;

pub use remote_context::Context;
pub use remote_error::RemoteError;
pub use remote_tuple::RemoteTuple;
pub use remote_value::RemoteValue;
pub use wire_codec::WireCodec;
pub use wire_error::{ConversionError, ValidationError, WireError};
pub use wire_filter::{
    ContextFilter, ContextValuesFilter, DeserializationFilter, ErrorFilter, FilterChain,
    FilterError, SerializationFilter,
};
pub use wire_param::{Param, Payload};
pub use wire_type_tag::{FieldTag, IntKind, Interface, TypeTag};
pub use wire_value::Value;
