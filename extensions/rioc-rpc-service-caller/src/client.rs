use crate::{
    ClientConfig, ClientInitError, LoadBalancer, RemoteProxy, RpcTransport, ServiceInvoker,
    ServiceRegistry,
};
use rioc::WireCodec;
use rioc_rpc_service::{MethodDescriptor, normalize_route_prefix};
use std::collections::HashMap;
use std::sync::Arc;

/// An initialized client: discovery has run and every proxy has its invoker.
#[derive(Debug)]
pub struct RemoteClient {
    registry: ServiceRegistry,
    invokers: HashMap<String, Arc<ServiceInvoker>>,
}

impl RemoteClient {
    /// Discovers services on every configured backend and binds each proxy.
    ///
    /// Configuration problems (bad route prefixes, services no backend
    /// offers, advertised methods a proxy does not declare) are collected and
    /// reported together as [`ClientInitError::Configuration`].
    pub async fn initialize(
        transport: Arc<dyn RpcTransport>,
        mut config: ClientConfig,
        proxies: &[Arc<dyn RemoteProxy>],
    ) -> Result<Self, ClientInitError> {
        let mut problems = Vec::new();
        if config.backends.is_empty() {
            problems.push("no backends configured".to_string());
        }
        for backend in &mut config.backends {
            match normalize_route_prefix(&backend.route_prefix) {
                Some(prefix) => backend.route_prefix = prefix,
                None => problems.push(format!(
                    "route prefix `{}` of backend {} must start with `/`",
                    backend.route_prefix, backend.address
                )),
            }
        }
        if !problems.is_empty() {
            return Err(ClientInitError::Configuration { problems });
        }

        let registry = ServiceRegistry::discover(transport.as_ref(), &config.backends).await?;
        let codec = WireCodec::new(config.filters.clone());

        let mut bindings = Vec::with_capacity(proxies.len());
        for proxy in proxies {
            let service_id = proxy.remote_service_id();
            let Some(service) = registry.service(&service_id) else {
                problems.push(format!("service `{service_id}` is not offered by any backend"));
                continue;
            };

            let mut declared: HashMap<String, MethodDescriptor> = proxy
                .describe_methods()
                .into_iter()
                .map(|method| (method.name.clone(), method))
                .collect();

            let mut methods = Vec::with_capacity(service.descriptor.methods.len());
            for name in &service.descriptor.methods {
                match declared.remove(name) {
                    Some(method) => methods.push(method),
                    None => problems.push(format!(
                        "remote component `{service_id}` method `{name}` is not declared by its proxy"
                    )),
                }
            }

            let load_balancer: Arc<dyn LoadBalancer> = proxy
                .load_balancer()
                .unwrap_or_else(|| config.load_balancer_for_service());

            let invoker = ServiceInvoker::new(
                service_id.clone(),
                transport.clone(),
                service.endpoints.clone(),
                load_balancer,
                methods,
                codec.clone(),
            )
            .with_debug(config.debug);

            bindings.push((proxy, Arc::new(invoker)));
        }

        if !problems.is_empty() {
            return Err(ClientInitError::Configuration { problems });
        }

        let mut invokers = HashMap::with_capacity(bindings.len());
        for (proxy, invoker) in bindings {
            tracing::info!(
                service_id = %invoker.service_id(),
                endpoints = invoker.endpoints().len(),
                "Bound remote component"
            );
            proxy.register_invoker(invoker.clone());
            invokers.insert(invoker.service_id().to_string(), invoker);
        }

        Ok(Self { registry, invokers })
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn invoker(&self, service_id: &str) -> Option<Arc<ServiceInvoker>> {
        self.invokers.get(service_id).cloned()
    }
}
