//! Subsidy allocation
//!
//! The full block subsidy is split in half: a guaranteed base half and
//! a loyalty half released in 24ths according to the miner's points.
//! All arithmetic is integer floor division; consensus code must use
//! these exact formulas, never a floating approximation.

use crate::consensus::{block_subsidy, Block};
use crate::constants::POINTS_MAX;
use crate::loyalty::{tag12_from_script, LoyaltyLedger, MinerTag};

/// The PoL decomposition of a full block subsidy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsidySplit {
    /// Guaranteed half, independent of loyalty
    pub base: u64,
    /// Loyalty half (carries the odd remainder, so loyal >= base)
    pub loyal: u64,
    /// Points-weighted share of the loyalty half
    pub bonus: u64,
    /// base + bonus
    pub allowed: u64,
}

/// Split a full subsidy according to a point score
pub fn split_subsidy(full: u64, points: i32) -> SubsidySplit {
    let base = full / 2;
    let loyal = full - base;
    let points = points.clamp(0, POINTS_MAX) as u64;
    let bonus = loyal * points / POINTS_MAX as u64;
    SubsidySplit {
        base,
        loyal,
        bonus,
        allowed: base + bonus,
    }
}

/// Allowed subsidy (base units) for a tag at a height
///
/// An unseen tag has 0 points and unlocks no bonus.
pub fn allowed_subsidy(ledger: &LoyaltyLedger, tag: &MinerTag, height: i64) -> u64 {
    let points = ledger.get_status(tag).map_or(0, |s| s.points);
    split_subsidy(block_subsidy(height), points).allowed
}

/// Base subsidy (base units) at a height: half of the full subsidy
pub fn base_subsidy(height: i64) -> u64 {
    block_subsidy(height) / 2
}

/// Sum of coinbase output value paying to scripts whose tag12 matches
///
/// Attributes coinbase value to a tag independent of the embedded-tag
/// mechanism. Zero-value and unspendable outputs are skipped.
pub fn coinbase_value_to_tag_script(block: &Block, tag: &MinerTag) -> u64 {
    let Some(coinbase) = block.coinbase() else {
        return 0;
    };

    let mut total: u64 = 0;
    for out in &coinbase.outputs {
        if out.value == 0 {
            continue;
        }
        if out.script_pubkey.is_unspendable() {
            continue;
        }
        if tag12_from_script(&out.script_pubkey) == *tag {
            total += out.value;
        }
    }
    total
}

/// Loyalty level shown to users: 0 for unseen/zero points, else
/// points folded two-to-one into levels 1..=12
pub fn level_from_points(seen: bool, points: i32) -> u8 {
    if !seen || points <= 0 {
        return 0;
    }
    let level = (points.min(POINTS_MAX) + 1) / 2;
    level.clamp(0, 12) as u8
}

/// Human-readable level label
pub fn level_text(level: u8) -> String {
    if level == 0 {
        "No level".to_string()
    } else {
        format!("Level {}", level)
    }
}
