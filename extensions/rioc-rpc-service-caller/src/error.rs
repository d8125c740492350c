use rioc::{ConversionError, RemoteError, ValidationError, Value, WireError};

/// An opaque failure of the underlying HTTP exchange.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request to {address} failed: {message}")]
    Request { address: String, message: String },

    #[error("{address} responded with status {status}: {body}")]
    Status {
        address: String,
        status: u16,
        body: String,
    },
}

/// Errors from a single remote call, as seen by the caller.
#[derive(Debug, thiserror::Error)]
pub enum RpcCallerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server rejected a param's kind before invoking the method.
    #[error(transparent)]
    Validation(ValidationError),

    /// The server could not convert a param or a return value.
    #[error(transparent)]
    Conversion(ConversionError),

    /// Local encoding of arguments or decoding of results failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("failed to serialize request payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed response from {address}: {reason}")]
    MalformedResponse { address: String, reason: String },

    #[error("remote server returned {actual} values, `{method}` declares {expected}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("method `{method}` is not exported by service `{service_id}`")]
    MethodNotFound { service_id: String, method: String },

    #[error("no endpoints available for service `{service_id}`")]
    NoEndpoints { service_id: String },

    #[error("load balancer selected endpoint {index} of {len}")]
    InvalidEndpointIndex { index: usize, len: usize },

    /// The proxy was called before an invoker was registered with it.
    #[error("remote service `{service_id}` has no invoker bound")]
    Unbound { service_id: String },

    /// The method ran and returned a non-nil error in its error slot.
    /// `values` holds every decoded return value, the error slot included.
    #[error("remote method failed: {error}")]
    Application { error: RemoteError, values: Vec<Value> },
}

impl RpcCallerError {
    /// The application error, when the remote method itself reported one.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            RpcCallerError::Application { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Errors that abort client initialization.
#[derive(Debug, thiserror::Error)]
pub enum ClientInitError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed metadata from {address}: {reason}")]
    MalformedMetadata { address: String, reason: String },

    /// Two backends advertise the same service with different method sets.
    #[error("remote component `{service_id}` differs between backends")]
    ContractMismatch { service_id: String },

    #[error("invalid client configuration: {}", problems.join("; "))]
    Configuration { problems: Vec<String> },
}
