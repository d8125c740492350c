use crate::wire::{Context, RemoteError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A typed value as seen by user code on either side of the wire.
///
/// Each variant corresponds to one discriminator of the wire model; the
/// [`WireCodec`](crate::WireCodec) converts between this form and the
/// generic JSON form carried inside a [`Param`](crate::Param).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// Field values keyed by their wire field key.
    Struct(BTreeMap<String, Value>),
    Slice(Vec<Value>),
    Array(Vec<Value>),
    /// `None` is the nil pointer.
    Pointer(Option<Box<Value>>),
    /// The error capability; `None` is the nil error.
    Error(Option<RemoteError>),
    Context(Context),
    /// A value of a custom interface type, already in its wire form.
    Custom(serde_json::Value),
}

impl Value {
    /// Short discriminator name used in mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Timestamp(_) => "timestamp",
            Value::Struct(_) => "struct",
            Value::Slice(_) => "slice",
            Value::Array(_) => "array",
            Value::Pointer(_) => "pointer",
            Value::Error(_) => "error",
            Value::Context(_) => "context",
            Value::Custom(_) => "custom",
        }
    }

    /// Wraps a value into a non-nil pointer.
    pub fn pointer(value: Value) -> Self {
        Value::Pointer(Some(Box::new(value)))
    }

    /// Returns the remote error carried by an error-capability value.
    pub fn as_remote_error(&self) -> Option<&RemoteError> {
        match self {
            Value::Error(Some(error)) => Some(error),
            _ => None,
        }
    }
}
