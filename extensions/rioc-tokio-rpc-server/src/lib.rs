mod rpc_server;
pub use rpc_server::*;

pub mod error;
pub use error::*;

pub mod utils;

pub use rioc_rpc_service_endpoint::{RemoteComponent, ServiceEndpoint};
