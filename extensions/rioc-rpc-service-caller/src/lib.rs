mod client;
pub use client::*;

mod config;
pub use config::*;

mod endpoint_handle;
pub use endpoint_handle::*;

pub mod error;
pub use error::*;

mod invoker;
pub use invoker::*;

mod load_balancer;
pub use load_balancer::*;

mod remote_proxy;
pub use remote_proxy::*;

mod service_registry;
pub use service_registry::*;

mod transport;
pub use transport::*;
