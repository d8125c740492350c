use rioc::{ConversionError, ValidationError};

/// Problems found while assembling an endpoint from its components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcServiceEndpointError {
    /// Every invalid binding found, not just the first.
    #[error("invalid remote component configuration: {}", problems.join("; "))]
    Configuration { problems: Vec<String> },
}

/// Why a single invocation was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("{msg}")]
    MalformedPayload { msg: String },

    #[error("method `{method}` is not exported by service `{service_id}`")]
    UnknownMethod { service_id: String, method: String },

    #[error(transparent)]
    Validation(ValidationError),

    #[error(transparent)]
    Conversion(ConversionError),
}

impl DispatchError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        DispatchError::MalformedPayload { msg: msg.into() }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::UnknownMethod { .. } => 404,
            DispatchError::MalformedPayload { .. }
            | DispatchError::Validation(_)
            | DispatchError::Conversion(_) => 400,
        }
    }

    /// The JSON body sent back with [`DispatchError::status_code`].
    pub fn body(&self) -> serde_json::Value {
        let structured = match self {
            DispatchError::Validation(err) => serde_json::to_value(err),
            DispatchError::Conversion(err) => serde_json::to_value(err),
            DispatchError::MalformedPayload { .. } | DispatchError::UnknownMethod { .. } => {
                return serde_json::json!({ "msg": self.to_string() });
            }
        };
        structured.unwrap_or_else(|err| serde_json::json!({ "msg": err.to_string() }))
    }
}
