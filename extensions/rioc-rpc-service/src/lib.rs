mod export_set;
pub use export_set::*;

mod method_descriptor;
pub use method_descriptor::*;

mod routes;
pub use routes::*;

mod service_descriptor;
pub use service_descriptor::*;
