use serde::{Deserialize, Serialize};

/// An error produced by a remote method and transported through the error
/// capability. Only its message survives the trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for RemoteError {
    fn from(message: &str) -> Self {
        RemoteError::new(message)
    }
}

impl From<String> for RemoteError {
    fn from(message: String) -> Self {
        RemoteError::new(message)
    }
}
