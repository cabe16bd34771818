//! Consensus module - Block structure, scripts, transactions, and the base subsidy schedule

mod block;
mod rewards;
mod script;
mod transaction;

pub use block::*;
pub use rewards::*;
pub use script::*;
pub use transaction::*;
