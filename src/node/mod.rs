//! Node module - genesis construction

mod genesis;

pub use genesis::*;
