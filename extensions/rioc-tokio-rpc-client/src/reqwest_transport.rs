use rioc_rpc_service_caller::{RpcTransport, TransportError, TransportResponse};
use std::time::Duration;

/// [`RpcTransport`] over plain HTTP using `reqwest`.
///
/// Addresses without a scheme are treated as `http://{address}`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-built `reqwest::Client` (proxies, pools, headers).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Applies `timeout` to every request.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    async fn send(
        &self,
        address: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<TransportResponse, TransportError> {
        let failed = |err: reqwest::Error| TransportError::Request {
            address: address.to_string(),
            message: err.to_string(),
        };
        let response = request.send().await.map_err(failed)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(failed)?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

pub(crate) fn backend_url(address: &str, path: &str) -> String {
    if address.contains("://") {
        format!("{}{path}", address.trim_end_matches('/'))
    } else {
        format!("http://{address}{path}")
    }
}

#[async_trait::async_trait]
impl RpcTransport for ReqwestTransport {
    async fn get(&self, address: &str, path: &str) -> Result<TransportResponse, TransportError> {
        let request = self.http.get(backend_url(address, path));
        self.send(address, request).await
    }

    async fn post(
        &self,
        address: &str,
        path: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, TransportError> {
        let request = self
            .http
            .post(backend_url(address, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.send(address, request).await
    }
}
