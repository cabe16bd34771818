//! Crypto module - hashing primitives

mod hash;

pub use hash::*;
