//! Proof-of-Loyalty module - tag identity, coinbase extraction, the
//! per-tag point ledger, subsidy allocation, and state rebuild
//!
//! This is the consensus-adjacent core of LYRA: deterministic loyalty
//! tracking driven by block-connection events. The same update path is
//! used live and during rebuild so the two always agree bit for bit.

mod extract;
mod ledger;
mod rebuild;
mod subsidy;
mod tag;

pub use extract::*;
pub use ledger::*;
pub use rebuild::*;
pub use subsidy::*;
pub use tag::*;
