//! Loyalty ledger - the per-tag point state machine
//!
//! Points reward monthly presence, not per-block presence: a tag seen
//! at least once in a month earns +2 for that month, and each fully
//! missed month since the last activity costs 1 point, clamped to
//! [0, 24]. The ledger is driven only by block-connection events, in
//! strictly increasing height order, and is rebuilt from the chain on
//! restart through the same update path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::consensus::Block;
use crate::constants::{
    DEFAULT_ENFORCE_HEIGHT, DEFAULT_EXTRANONCE1_SIZE, DEFAULT_MONTH_BLOCKS, DEFAULT_START_HEIGHT,
    POINTS_MAX, POINTS_PER_ACTIVE_MONTH, POINTS_PER_MISSED_MONTH,
};
use crate::loyalty::{extract_miner_tag, MinerTag};

/// Map a block height to its PoL month index
///
/// Total function: degenerate configurations and negative heights all
/// map to month 0.
pub fn month_index(height: i64, month_blocks: i64) -> i64 {
    if month_blocks <= 0 {
        return 0;
    }
    if height < 0 {
        return 0;
    }
    height / month_blocks
}

/// PoL tunables, injected into the ledger at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolParams {
    /// Height at which tag tracking begins
    pub start_height: i64,
    /// Height at which the allowed-subsidy rule is enforced
    pub enforce_height: i64,
    /// Month length in blocks
    pub month_blocks: i64,
    /// Stratum extranonce1 size in bytes (informational, clamped to [0, 16])
    pub extranonce1_size: u8,
}

impl PolParams {
    pub fn new(start_height: i64, enforce_height: i64, month_blocks: i64, extranonce1_size: i64) -> Self {
        Self {
            start_height,
            enforce_height,
            month_blocks,
            extranonce1_size: extranonce1_size.clamp(0, 16) as u8,
        }
    }
}

impl Default for PolParams {
    fn default() -> Self {
        Self {
            start_height: DEFAULT_START_HEIGHT,
            enforce_height: DEFAULT_ENFORCE_HEIGHT,
            month_blocks: DEFAULT_MONTH_BLOCKS,
            extranonce1_size: DEFAULT_EXTRANONCE1_SIZE,
        }
    }
}

/// Tracking state for one miner tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerTagStatus {
    /// Whether this tag has ever been observed
    pub seen: bool,
    /// Height of first observation (-1 if never)
    pub first_seen_height: i64,
    /// Height of most recent observation (-1 if never)
    pub last_seen_height: i64,
    /// Total observations
    pub blocks_seen: u32,
    /// Timestamp of most recent observation (unix seconds)
    pub last_seen_time: i64,
    /// Current loyalty score, 0..=24
    pub points: i32,
    /// Month index of most recent observation (-1 if never)
    pub last_seen_month: i64,
}

impl Default for MinerTagStatus {
    fn default() -> Self {
        Self {
            seen: false,
            first_seen_height: -1,
            last_seen_height: -1,
            blocks_seen: 0,
            last_seen_time: 0,
            points: 0,
            last_seen_month: -1,
        }
    }
}

/// The loyalty ledger: tag hex -> status
///
/// Owns its storage behind a single mutex; every read observes either
/// the pre- or post-update state of a record, never a partial update.
/// The block-connect path is invoked by one caller at a time in
/// increasing height order; queries may come from any thread.
#[derive(Debug)]
pub struct LoyaltyLedger {
    params: PolParams,
    state: Mutex<HashMap<String, MinerTagStatus>>,
}

impl LoyaltyLedger {
    pub fn new(params: PolParams) -> Self {
        Self {
            params,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn params(&self) -> &PolParams {
        &self.params
    }

    /// Block-connect hook: extract the coinbase tag and record it
    ///
    /// No-op below the configured start height or when the coinbase
    /// carries no marker.
    pub fn on_block_connected(&self, block: &Block, height: i64, time: i64) {
        if height < self.params.start_height {
            return;
        }
        let Some(tag) = extract_miner_tag(block) else {
            return;
        };
        self.record_observation(&tag, height, time);
    }

    /// Block-disconnect hook: intentionally a no-op
    ///
    /// Points attributed to blocks that are later orphaned are not
    /// retracted here; a full rebuild from the active chain is the only
    /// correction mechanism. Callers that want reorg-aware accounting
    /// can trigger `clear` + rebuild from this hook.
    pub fn on_block_disconnected(&self, _block: &Block, _height: i64) {}

    /// Apply one observation of `tag` to the state machine
    pub fn record_observation(&self, tag: &MinerTag, height: i64, time: i64) {
        let key = tag.hex();
        let cur_month = month_index(height, self.params.month_blocks);

        let mut state = self.state.lock().unwrap();
        let s = state.entry(key.clone()).or_default();

        if !s.seen {
            s.seen = true;
            s.first_seen_height = height;
            s.last_seen_month = cur_month;
            // First active month => +2 points (clamped). Deterministic.
            s.points = (s.points + POINTS_PER_ACTIVE_MONTH).clamp(0, POINTS_MAX);
        } else if cur_month > s.last_seen_month {
            // Month transitions: +2 per active month, -1 per missed month.
            // Intermediate math in i64: a long-dormant tag can miss more
            // months than i32 holds.
            let missed = cur_month - s.last_seen_month - 1;
            let mut points = s.points as i64;
            if missed > 0 {
                points -= missed * POINTS_PER_MISSED_MONTH as i64;
            }
            points += POINTS_PER_ACTIVE_MONTH as i64;
            s.points = points.clamp(0, POINTS_MAX as i64) as i32;
            s.last_seen_month = cur_month;
        }

        s.last_seen_height = height;
        s.last_seen_time = time;
        s.blocks_seen += 1;

        debug!(
            height,
            tag = %key,
            len = tag.len(),
            points = s.points,
            month = s.last_seen_month,
            "pol tag observed"
        );
    }

    /// Current status of a tag, or None if it has never been observed
    pub fn get_status(&self, tag: &MinerTag) -> Option<MinerTagStatus> {
        let state = self.state.lock().unwrap();
        state.get(&tag.hex()).copied()
    }

    /// Drop every record (rebuild entry point)
    pub fn clear(&self) {
        self.state.lock().unwrap().clear();
    }

    /// Number of tracked tags
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
