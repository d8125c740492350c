mod reqwest_transport;
pub use reqwest_transport::*;

mod rpc_client;
pub use rpc_client::*;

pub use rioc_rpc_service_caller::{
    BackendConfig, ClientConfig, ClientInitError, LowestLatency, RandomChoice, RemoteProxy,
    RoundRobin, RpcCallerError,
};

pub use rioc::{Context, FilterChain, RemoteError};
