use serde::{Deserialize, Serialize};
use std::fmt;

/// A param's `kind` did not match the declared type at its `order`.
///
/// Raised at the server boundary before the target method is invoked; the
/// JSON form is what the dispatcher sends back with a 400 status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error(
    "{msg}: parameter {param_order} requires kind `{required_param_kind}`, got `{request_param_kind}`"
)]
pub struct ValidationError {
    pub msg: String,
    pub required_param_kind: String,
    pub request_param_kind: String,
    pub param_order: usize,
    pub value: serde_json::Value,
}

impl ValidationError {
    pub fn invalid_kind(
        order: usize,
        required: impl Into<String>,
        requested: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            msg: "invalid parameter type".to_string(),
            required_param_kind: required.into(),
            request_param_kind: requested.into(),
            param_order: order,
            value,
        }
    }
}

/// A value could not be converted between its typed and wire forms.
///
/// `path` describes how deep the failure happened, e.g. `.subs.[]*Sub.$2.float`,
/// and `value` is the offending raw value at that depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionError {
    pub order: usize,
    pub kind: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "error")]
    pub reason: String,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter[{}]{}: {}", self.order, self.path, self.reason)
    }
}

impl std::error::Error for ConversionError {}

/// Everything that can go wrong while marshaling values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// No filter claimed an interface-typed value.
    #[error("parameter[{order}]: unsupported interface `{kind}`, no filter claims it")]
    UnsupportedInterface { order: usize, kind: String },

    /// A [`Value`](crate::Value) did not have the shape a Rust type expected.
    #[error("expected {expected} value, found {actual}")]
    Mismatch { expected: String, actual: String },

    /// A value list did not have the length a tuple expected.
    #[error("expected {expected} values, found {actual}")]
    Arity { expected: usize, actual: usize },
}

impl WireError {
    pub fn mismatch(expected: impl Into<String>, actual: &crate::Value) -> Self {
        WireError::Mismatch {
            expected: expected.into(),
            actual: actual.kind_name().to_string(),
        }
    }
}
