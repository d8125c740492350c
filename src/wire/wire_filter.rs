use crate::wire::{Context, Interface, RemoteError, Value};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

/// Error type filters report when they claim a value but cannot convert it.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Converts an interface-typed value into its wire form.
///
/// Returning `Ok(None)` means the filter does not handle this interface and
/// the next filter in the chain is consulted.
pub trait SerializationFilter: Send + Sync {
    fn serialize(
        &self,
        interface: &Interface,
        value: &Value,
    ) -> Result<Option<serde_json::Value>, FilterError>;
}

/// Rebuilds an interface-typed value from its wire form.
///
/// Returning `Ok(None)` means the filter does not handle this interface.
pub trait DeserializationFilter: Send + Sync {
    fn deserialize(
        &self,
        interface: &Interface,
        raw: &serde_json::Value,
    ) -> Result<Option<Value>, FilterError>;
}

impl<F> SerializationFilter for F
where
    F: Fn(&Interface, &Value) -> Result<Option<serde_json::Value>, FilterError> + Send + Sync,
{
    fn serialize(
        &self,
        interface: &Interface,
        value: &Value,
    ) -> Result<Option<serde_json::Value>, FilterError> {
        self(interface, value)
    }
}

impl<F> DeserializationFilter for F
where
    F: Fn(&Interface, &serde_json::Value) -> Result<Option<Value>, FilterError> + Send + Sync,
{
    fn deserialize(
        &self,
        interface: &Interface,
        raw: &serde_json::Value,
    ) -> Result<Option<Value>, FilterError> {
        self(interface, raw)
    }
}

/// The error capability: a non-nil error travels as its message string, the
/// nil error as `null`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorFilter;

impl SerializationFilter for ErrorFilter {
    fn serialize(
        &self,
        interface: &Interface,
        value: &Value,
    ) -> Result<Option<serde_json::Value>, FilterError> {
        if *interface != Interface::Error {
            return Ok(None);
        }
        match value {
            Value::Error(None) => Ok(Some(serde_json::Value::Null)),
            Value::Error(Some(error)) => {
                Ok(Some(serde_json::Value::String(error.message().to_string())))
            }
            other => Err(format!("value is not an error, found {}", other.kind_name()).into()),
        }
    }
}

impl DeserializationFilter for ErrorFilter {
    fn deserialize(
        &self,
        interface: &Interface,
        raw: &serde_json::Value,
    ) -> Result<Option<Value>, FilterError> {
        if *interface != Interface::Error {
            return Ok(None);
        }
        match raw {
            serde_json::Value::Null => Ok(Some(Value::Error(None))),
            serde_json::Value::String(message) => {
                Ok(Some(Value::Error(Some(RemoteError::new(message.clone())))))
            }
            _ => Err("value is not a string".into()),
        }
    }
}

/// The context capability. Nothing meaningful is sent, and the receiving side
/// always gets a fresh background context.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextFilter;

impl SerializationFilter for ContextFilter {
    fn serialize(
        &self,
        interface: &Interface,
        _value: &Value,
    ) -> Result<Option<serde_json::Value>, FilterError> {
        Ok((*interface == Interface::Context).then_some(serde_json::Value::Null))
    }
}

impl DeserializationFilter for ContextFilter {
    fn deserialize(
        &self,
        interface: &Interface,
        _raw: &serde_json::Value,
    ) -> Result<Option<Value>, FilterError> {
        Ok((*interface == Interface::Context).then(|| Value::Context(Context::background())))
    }
}

/// Opt-in serialization filter that sends a context's key/value pairs as a
/// JSON object.
///
/// Only the outgoing side changes: the built-in deserialization still hands
/// the remote method a background context unless the server installs its own
/// deserialization filter for `context.Context`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextValuesFilter;

impl SerializationFilter for ContextValuesFilter {
    fn serialize(
        &self,
        interface: &Interface,
        value: &Value,
    ) -> Result<Option<serde_json::Value>, FilterError> {
        if *interface != Interface::Context {
            return Ok(None);
        }
        match value {
            Value::Context(context) => {
                let map = context
                    .values()
                    .iter()
                    .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
                    .collect::<serde_json::Map<_, _>>();
                Ok(Some(serde_json::Value::Object(map)))
            }
            other => Err(format!("value is not a context, found {}", other.kind_name()).into()),
        }
    }
}

static BUILTIN_SERIALIZERS: Lazy<Vec<Arc<dyn SerializationFilter>>> =
    Lazy::new(|| vec![Arc::new(ContextFilter), Arc::new(ErrorFilter)]);

static BUILTIN_DESERIALIZERS: Lazy<Vec<Arc<dyn DeserializationFilter>>> =
    Lazy::new(|| vec![Arc::new(ContextFilter), Arc::new(ErrorFilter)]);

/// Ordered (de)serialization filters for interface-typed values.
///
/// Caller-supplied filters run in registration order, followed by the
/// built-in context and error filters. The first filter to claim a value wins.
#[derive(Clone, Default)]
pub struct FilterChain {
    serializers: Vec<Arc<dyn SerializationFilter>>,
    deserializers: Vec<Arc<dyn DeserializationFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_serialization_filter<F>(mut self, filter: F) -> Self
    where
        F: SerializationFilter + 'static,
    {
        self.serializers.push(Arc::new(filter));
        self
    }

    pub fn with_deserialization_filter<F>(mut self, filter: F) -> Self
    where
        F: DeserializationFilter + 'static,
    {
        self.deserializers.push(Arc::new(filter));
        self
    }

    pub fn serialize(
        &self,
        interface: &Interface,
        value: &Value,
    ) -> Result<Option<serde_json::Value>, FilterError> {
        for filter in self.serializers.iter().chain(BUILTIN_SERIALIZERS.iter()) {
            if let Some(wire) = filter.serialize(interface, value)? {
                return Ok(Some(wire));
            }
        }
        Ok(None)
    }

    pub fn deserialize(
        &self,
        interface: &Interface,
        raw: &serde_json::Value,
    ) -> Result<Option<Value>, FilterError> {
        for filter in self.deserializers.iter().chain(BUILTIN_DESERIALIZERS.iter()) {
            if let Some(value) = filter.deserialize(interface, raw)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("serializers", &self.serializers.len())
            .field("deserializers", &self.deserializers.len())
            .finish()
    }
}
