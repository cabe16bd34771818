//! Ledger rebuild
//!
//! The in-memory tag state is normally built while blocks are
//! CONNECTED. When restarting from an already-built chainstate, old
//! blocks are not re-connected, so the state must be rebuilt from
//! storage once, through the exact same update path, to stay
//! deterministic across restarts.
//!
//! Lock order: the caller holds the chain state (exclusively, for the
//! whole scan) BEFORE this function touches the ledger's internal
//! lock. Never take the chain lock while holding the ledger lock.

use tracing::{info, warn};

use crate::loyalty::LoyaltyLedger;
use crate::storage::ChainState;

/// Clear the ledger and replay the active chain through the connect path
///
/// Heights whose block cannot be read are logged and skipped, leaving a
/// permanent gap in the derived state; no retry is attempted.
pub fn rebuild_from_chain(ledger: &LoyaltyLedger, chain: &ChainState) {
    let tip = chain.tip_height();
    if tip < 0 {
        return;
    }

    ledger.clear();

    let start_height = ledger.params().start_height.max(0);
    info!(start_height, tip, "pol rebuild: scanning blocks");

    for height in start_height..=tip {
        let Some(block) = chain.block_at(height) else {
            warn!(height, "pol rebuild: block read failed, skipping height");
            continue;
        };

        // Reuse the connect hook so business rules are never duplicated.
        ledger.on_block_connected(block, height, block.header.timestamp as i64);
    }

    info!(tags = ledger.len(), "pol rebuild: done");
}
