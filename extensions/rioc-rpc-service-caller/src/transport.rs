use crate::TransportError;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The narrow HTTP seam the client runs over.
///
/// `address` is a backend address as configured (with or without a scheme);
/// `path` is an absolute route including any route prefix. A non-2xx status
/// is not an error at this level.
#[async_trait::async_trait]
pub trait RpcTransport: Send + Sync {
    async fn get(&self, address: &str, path: &str) -> Result<TransportResponse, TransportError>;

    async fn post(
        &self,
        address: &str,
        path: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, TransportError>;
}
