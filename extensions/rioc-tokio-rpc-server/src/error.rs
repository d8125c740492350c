use rioc_rpc_service_endpoint::RpcServiceEndpointError;

#[derive(Debug, thiserror::Error)]
pub enum RpcServerError {
    /// The server left `Idle` already; it starts at most once.
    #[error("server is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Endpoint(#[from] RpcServiceEndpointError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("route prefix `{0}` must be empty or start with `/`")]
    InvalidRoutePrefix(String),
}
