//! Note: This `RpcServer` does not include authentication or authorization.
//! It is suited to trusted, internal networks. Anything holding a
//! [`ServiceEndpoint`] can act as a server; this one does so over HTTP using
//! the Axum web framework.

use crate::RpcServerError;
use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use rioc::FilterChain;
use rioc_rpc_service::{
    health_route, invocation_route, meta_route, normalize_route_prefix, route_segment_problem,
};
use rioc_rpc_service_endpoint::{EndpointResponse, RemoteComponent, ServiceEndpoint};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Bind address, route prefix and filters for one server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub route_prefix: String,
    pub filters: FilterChain,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            route_prefix: String::new(),
            filters: FilterChain::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    pub fn with_route_prefix(mut self, route_prefix: impl Into<String>) -> Self {
        self.route_prefix = route_prefix.into();
        self
    }

    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerState {
    Idle = 0,
    Running = 1,
}

impl From<u8> for ServerState {
    fn from(value: u8) -> Self {
        match value {
            0 => ServerState::Idle,
            _ => ServerState::Running,
        }
    }
}

/// An HTTP server exposing registered components.
///
/// Components are registered while the server is `Idle`. Starting it moves
/// it to `Running` for good; there is no stop.
pub struct RpcServer {
    config: ServerConfig,
    components: Mutex<Vec<Arc<dyn RemoteComponent>>>,
    state: AtomicU8,
}

impl RpcServer {
    /// Validates and normalizes the configured route prefix.
    pub fn new(mut config: ServerConfig) -> Result<Self, RpcServerError> {
        config.route_prefix = normalize_route_prefix(&config.route_prefix)
            .filter(|prefix| {
                prefix
                    .split('/')
                    .skip(1)
                    .all(|segment| route_segment_problem(segment).is_none())
            })
            .ok_or_else(|| RpcServerError::InvalidRoutePrefix(config.route_prefix.clone()))?;
        Ok(RpcServer {
            config,
            components: Mutex::new(Vec::new()),
            state: AtomicU8::new(ServerState::Idle as u8),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> ServerState {
        ServerState::from(self.state.load(Ordering::Acquire))
    }

    /// Adds a component to be exported when the server starts.
    pub async fn register<C>(&self, component: C) -> Result<(), RpcServerError>
    where
        C: RemoteComponent,
    {
        self.register_arc(Arc::new(component)).await
    }

    pub async fn register_arc(
        &self,
        component: Arc<dyn RemoteComponent>,
    ) -> Result<(), RpcServerError> {
        let mut components = self.components.lock().await;
        if self.state() != ServerState::Idle {
            return Err(RpcServerError::AlreadyRunning);
        }
        tracing::debug!(service_id = %component.remote_service_id(), "Registered component");
        components.push(component);
        Ok(())
    }

    /// Binds the configured address and serves until the listener fails.
    pub async fn serve(self: Arc<Self>) -> Result<SocketAddr, RpcServerError> {
        let listener = TcpListener::bind(self.config.addr.as_str()).await?;
        self.serve_with_listener(listener).await
    }

    /// Starts the server on a pre-bound `TcpListener`.
    ///
    /// Useful for binding to an ephemeral port (port 0) and reading the actual
    /// address first.
    pub async fn serve_with_listener(
        self: Arc<Self>,
        listener: TcpListener,
    ) -> Result<SocketAddr, RpcServerError> {
        let address = listener.local_addr()?;
        let (app, routes) = self.start().await?;

        tracing::info!(
            address = %address,
            route_prefix = %self.config.route_prefix,
            routes,
            "Server running on {:?}",
            address
        );
        axum::serve(listener, app).await?;
        Ok(address)
    }

    /// Builds the endpoint and its router from every registered component,
    /// then moves `Idle → Running`. A configuration error leaves the server
    /// `Idle`. Returns the router and its route count.
    async fn start(&self) -> Result<(Router, usize), RpcServerError> {
        let components = self.components.lock().await;
        if self.state() != ServerState::Idle {
            return Err(RpcServerError::AlreadyRunning);
        }

        let endpoint = components
            .iter()
            .fold(ServiceEndpoint::builder(), |builder, component| {
                builder.component(component.clone())
            })
            .filters(self.config.filters.clone())
            .build()?;
        let routes = endpoint.invocation_targets().len() + 2;
        let app = build_router(Arc::new(endpoint), &self.config.route_prefix);

        self.state
            .store(ServerState::Running as u8, Ordering::Release);
        Ok((app, routes))
    }
}

/// Routes `/meta`, `/health` and one POST route per exported method, all
/// under `route_prefix`.
///
/// Service ids and method names are route segments; a built
/// [`ServiceEndpoint`] has already rejected any that axum cannot route.
pub fn build_router(endpoint: Arc<ServiceEndpoint>, route_prefix: &str) -> Router {
    let mut router = Router::new()
        .route(
            &meta_route(route_prefix),
            get({
                let endpoint = endpoint.clone();
                move || async move { into_response(endpoint.meta_response()) }
            }),
        )
        .route(
            &health_route(route_prefix),
            get({
                let endpoint = endpoint.clone();
                move || async move { into_response(endpoint.health_response()) }
            }),
        );

    for (service_id, method) in endpoint.invocation_targets() {
        let path = invocation_route(route_prefix, &service_id, &method);
        let endpoint = endpoint.clone();
        router = router.route(
            &path,
            post(move |body: Bytes| {
                let endpoint = endpoint.clone();
                let service_id = service_id.clone();
                let method = method.clone();
                async move {
                    into_response(
                        endpoint
                            .handle_invocation(&service_id, &method, &body)
                            .await,
                    )
                }
            }),
        );
    }
    router
}

fn into_response(response: EndpointResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}
