mod math_server;
pub use math_server::*;

mod math_server_proxy;
pub use math_server_proxy::*;

mod types;
pub use types::*;

/// Service id both sides of the example agree on.
pub const MATH_SERVER_ID: &str = "MathServer";
