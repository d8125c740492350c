use crate::ReqwestTransport;
use rioc_rpc_service::{health_route, normalize_route_prefix};
use rioc_rpc_service_caller::{
    BackendConfig, ClientConfig, ClientInitError, RemoteClient, RemoteProxy, RpcTransport,
    ServiceInvoker, ServiceRegistry, TransportError,
};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;

/// A connected HTTP client: services are discovered and every proxy passed to
/// [`RpcClient::connect`] is bound and callable.
pub struct RpcClient {
    inner: RemoteClient,
    transport: Arc<dyn RpcTransport>,
    backends: Vec<BackendConfig>,
}

impl RpcClient {
    /// Discovers services over HTTP and binds `proxies` to them.
    pub async fn connect(
        config: ClientConfig,
        proxies: &[Arc<dyn RemoteProxy>],
    ) -> Result<RpcClient, ClientInitError> {
        Self::connect_with_transport(Arc::new(ReqwestTransport::new()), config, proxies).await
    }

    pub async fn connect_with_transport(
        transport: Arc<dyn RpcTransport>,
        config: ClientConfig,
        proxies: &[Arc<dyn RemoteProxy>],
    ) -> Result<RpcClient, ClientInitError> {
        let backends: Vec<BackendConfig> = config
            .backends
            .iter()
            .map(|backend| BackendConfig {
                address: backend.address.clone(),
                route_prefix: normalize_route_prefix(&backend.route_prefix).unwrap_or_default(),
            })
            .collect();
        let inner = RemoteClient::initialize(transport.clone(), config, proxies).await?;
        tracing::info!(
            backends = backends.len(),
            services = inner.registry().len(),
            "Client connected"
        );
        Ok(RpcClient {
            inner,
            transport,
            backends,
        })
    }

    pub fn registry(&self) -> &ServiceRegistry {
        self.inner.registry()
    }

    pub fn invoker(&self, service_id: &str) -> Option<Arc<ServiceInvoker>> {
        self.inner.invoker(service_id)
    }

    /// Probes every backend's health route concurrently.
    ///
    /// Results follow configuration order; a backend is healthy when it
    /// answers `{"status": "ok"}`.
    pub async fn health(&self) -> Vec<(String, Result<bool, TransportError>)> {
        let mut probes = JoinSet::new();
        for (index, backend) in self.backends.iter().cloned().enumerate() {
            let transport = self.transport.clone();
            probes.spawn(async move { (index, probe(transport.as_ref(), &backend).await) });
        }

        let mut results: Vec<Option<Result<bool, TransportError>>> =
            self.backends.iter().map(|_| None).collect();
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(err) => tracing::warn!("Health probe task failed: {err}"),
            }
        }

        self.backends
            .iter()
            .zip(results)
            .map(|(backend, result)| {
                let result = result.unwrap_or_else(|| {
                    Err(TransportError::Request {
                        address: backend.address.clone(),
                        message: "health probe did not complete".to_string(),
                    })
                });
                (backend.address.clone(), result)
            })
            .collect()
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("inner", &self.inner)
            .field("backends", &self.backends)
            .finish()
    }
}

async fn probe(
    transport: &dyn RpcTransport,
    backend: &BackendConfig,
) -> Result<bool, TransportError> {
    let response = transport
        .get(&backend.address, &health_route(&backend.route_prefix))
        .await?;
    if !response.is_success() {
        return Ok(false);
    }
    let body: serde_json::Value =
        serde_json::from_slice(&response.body).unwrap_or(serde_json::Value::Null);
    Ok(body["status"] == "ok")
}
