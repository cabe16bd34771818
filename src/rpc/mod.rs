//! JSON-RPC API Module
//!
//! Provides the HTTP interface for querying loyalty status and
//! subsidy allocation.

mod methods;
mod server;

pub use methods::*;
pub use server::*;
