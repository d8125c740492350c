mod component;
pub use component::*;

mod endpoint;
pub use endpoint::*;

pub mod error;
pub use error::*;

mod loopback_transport;
pub use loopback_transport::*;

mod method_table;
pub use method_table::*;
