use crate::{LoadBalancer, RoundRobin};
use rioc::FilterChain;
use std::fmt;
use std::sync::Arc;

/// One backend process the client discovers services on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub address: String,
    pub route_prefix: String,
}

impl BackendConfig {
    pub fn new(address: impl Into<String>, route_prefix: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            route_prefix: route_prefix.into(),
        }
    }
}

/// Builds the load-balancing policy for one service.
pub type LoadBalancerFactory = Arc<dyn Fn() -> Arc<dyn LoadBalancer> + Send + Sync>;

/// Client-side settings.
///
/// `load_balancer` is called once per service unless a proxy supplies its own
/// policy, so stateful policies never share state across services. When
/// unset, each service gets a fresh [`RoundRobin`](crate::RoundRobin).
/// `debug` logs full request and response payloads.
#[derive(Clone, Default)]
pub struct ClientConfig {
    pub backends: Vec<BackendConfig>,
    pub debug: bool,
    pub load_balancer: Option<LoadBalancerFactory>,
    pub filters: FilterChain,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, address: impl Into<String>, route_prefix: impl Into<String>) -> Self {
        self.backends.push(BackendConfig::new(address, route_prefix));
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Uses the policy `factory` builds, one instance per service.
    ///
    /// ```ignore
    /// let config = ClientConfig::new().with_load_balancer(RoundRobin::new);
    /// ```
    pub fn with_load_balancer<F, L>(mut self, factory: F) -> Self
    where
        F: Fn() -> L + Send + Sync + 'static,
        L: LoadBalancer + 'static,
    {
        self.load_balancer = Some(Arc::new(move || -> Arc<dyn LoadBalancer> {
            Arc::new(factory())
        }));
        self
    }

    /// A fresh policy for one service: the configured one, or round-robin.
    pub fn load_balancer_for_service(&self) -> Arc<dyn LoadBalancer> {
        match &self.load_balancer {
            Some(factory) => factory(),
            None => Arc::new(RoundRobin::new()),
        }
    }

    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("backends", &self.backends)
            .field("debug", &self.debug)
            .field("load_balancer", &self.load_balancer.is_some())
            .field("filters", &self.filters)
            .finish()
    }
}
