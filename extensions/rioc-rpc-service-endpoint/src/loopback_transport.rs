use crate::{EndpointResponse, ServiceEndpoint};
use rioc::constants::{ROUTE_COMPONENT, ROUTE_HEALTH, ROUTE_META, ROUTE_METHODS_SEGMENT};
use rioc_rpc_service::normalize_route_prefix;
use rioc_rpc_service_caller::{RpcTransport, TransportError, TransportResponse};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct LoopbackBackend {
    route_prefix: String,
    endpoint: Arc<ServiceEndpoint>,
    calls: AtomicUsize,
}

/// An in-process [`RpcTransport`] that routes requests straight into
/// [`ServiceEndpoint`]s keyed by address, with no sockets involved.
///
/// Routes the same paths the HTTP server does. Unknown addresses fail like a
/// refused connection.
#[derive(Default)]
pub struct LoopbackTransport {
    backends: HashMap<String, LoopbackBackend>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `endpoint` at `address` under `route_prefix`.
    pub fn with_backend(
        mut self,
        address: impl Into<String>,
        route_prefix: &str,
        endpoint: Arc<ServiceEndpoint>,
    ) -> Self {
        self.backends.insert(
            address.into(),
            LoopbackBackend {
                route_prefix: normalize_route_prefix(route_prefix).unwrap_or_default(),
                endpoint,
                calls: AtomicUsize::new(0),
            },
        );
        self
    }

    /// Number of invocations (POSTs) routed to `address` so far.
    pub fn invocations(&self, address: &str) -> usize {
        self.backends
            .get(address)
            .map(|backend| backend.calls.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    fn backend(&self, address: &str) -> Result<&LoopbackBackend, TransportError> {
        self.backends
            .get(address)
            .ok_or_else(|| TransportError::Request {
                address: address.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

fn not_found() -> EndpointResponse {
    EndpointResponse {
        status: 404,
        body: b"Not Found".to_vec(),
    }
}

fn into_transport(response: EndpointResponse) -> TransportResponse {
    TransportResponse::new(response.status, response.body)
}

/// Splits `/component/{service_id}/methods/{method}` into its two names.
fn invocation_target(route: &str) -> Option<(&str, &str)> {
    let rest = route.strip_prefix(ROUTE_COMPONENT)?.strip_prefix('/')?;
    let (service_id, rest) = rest.split_once('/')?;
    let method = rest.strip_prefix(ROUTE_METHODS_SEGMENT)?.strip_prefix('/')?;
    (!service_id.is_empty() && !method.is_empty() && !method.contains('/'))
        .then_some((service_id, method))
}

#[async_trait::async_trait]
impl RpcTransport for LoopbackTransport {
    async fn get(&self, address: &str, path: &str) -> Result<TransportResponse, TransportError> {
        let backend = self.backend(address)?;
        let response = match path.strip_prefix(backend.route_prefix.as_str()) {
            Some(ROUTE_META) => backend.endpoint.meta_response(),
            Some(ROUTE_HEALTH) => backend.endpoint.health_response(),
            _ => not_found(),
        };
        Ok(into_transport(response))
    }

    async fn post(
        &self,
        address: &str,
        path: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, TransportError> {
        let backend = self.backend(address)?;
        let target = path
            .strip_prefix(backend.route_prefix.as_str())
            .and_then(invocation_target);
        let response = match target {
            Some((service_id, method)) => {
                backend.calls.fetch_add(1, Ordering::SeqCst);
                backend
                    .endpoint
                    .handle_invocation(service_id, method, &body)
                    .await
            }
            None => not_found(),
        };
        Ok(into_transport(response))
    }
}
