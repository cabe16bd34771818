//! Storage module - height-indexed chain state and sled persistence

mod db;
mod state;

pub use db::*;
pub use state::*;
