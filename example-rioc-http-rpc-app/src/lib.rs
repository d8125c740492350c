mod cli;
pub use cli::*;

mod demo;
pub use demo::*;
