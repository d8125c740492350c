//! Type-driven wire marshaling for remote component invocation.
//!
//! Values cross the wire as an ordered list of [`Param`] records, each tagged
//! with the `kind` of the declared type it was encoded against. The
//! [`WireCodec`] rebuilds typed [`Value`]s from that generic form using the
//! receiving side's declared [`TypeTag`], consulting a [`FilterChain`] for
//! interface-shaped types such as the error and context capabilities.

pub mod constants;
mod macros;
pub mod wire;

pub use wire::*;
