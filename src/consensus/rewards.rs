//! Base block subsidy schedule
//!
//! Deterministic halving schedule: the full subsidy starts at 50 LYRA
//! and halves every 210,000 blocks. The PoL engine splits this value
//! into a guaranteed base half and a loyalty-weighted bonus half; see
//! the loyalty module for that split.

use crate::constants::{INITIAL_SUBSIDY, SUBSIDY_HALVING_INTERVAL};

/// Calculate the full block subsidy for a given height
///
/// This is a pure, deterministic function. Genesis carries no subsidy,
/// and the reward reaches zero after 64 halvings.
pub fn block_subsidy(height: i64) -> u64 {
    if height <= 0 {
        return 0;
    }

    let halvings = height / SUBSIDY_HALVING_INTERVAL;
    // Shifting a u64 by 64 or more is undefined; the subsidy is zero there anyway
    if halvings >= 64 {
        return 0;
    }

    INITIAL_SUBSIDY >> halvings
}

/// Total subsidy issued through a given height, excluding genesis
///
/// Used for testing and verification only.
pub fn cumulative_subsidy(up_to_height: i64) -> u64 {
    let mut total: u64 = 0;
    for height in 1..=up_to_height {
        total = total.saturating_add(block_subsidy(height));
    }
    total
}
