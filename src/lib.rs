//! LYRA Blockchain Core Library
//!
//! A PoW cryptocurrency whose block subsidy carries a Proof-of-Loyalty
//! (PoL) bonus: miners embed an identifying tag in their coinbase, and
//! sustained monthly presence of that tag earns a graduated share of
//! the loyalty half of the block reward.

pub mod consensus;
pub mod crypto;
pub mod loyalty;
pub mod node;
pub mod rpc;
pub mod storage;

/// Protocol constants - HARD-CODED, NEVER CONFIGURABLE
pub mod constants {
    /// Base monetary unit: 1 LYRA = 100,000,000 base units
    pub const COIN: u64 = 100_000_000;

    /// Initial block subsidy (in base units)
    pub const INITIAL_SUBSIDY: u64 = 50 * COIN;

    /// Blocks between subsidy halvings
    pub const SUBSIDY_HALVING_INTERVAL: i64 = 210_000;

    /// ASCII marker prefix for the coinbase OP_RETURN miner tag
    pub const TAG_PREFIX: [u8; 7] = *b"LYRATAG";

    /// Canonical derived-tag length in bytes (96-bit identity)
    pub const POL_TAG_LEN: usize = 12;

    /// Points credited for each active month
    pub const POINTS_PER_ACTIVE_MONTH: i32 = 2;

    /// Points lost for each fully missed month
    pub const POINTS_PER_MISSED_MONTH: i32 = 1;

    /// Loyalty score ceiling
    pub const POINTS_MAX: i32 = 24;

    /// Default PoL month length in blocks (one LYRA-month)
    pub const DEFAULT_MONTH_BLOCKS: i64 = 4320;

    /// Default height at which PoL tracking begins
    pub const DEFAULT_START_HEIGHT: i64 = 1;

    /// Default height at which the allowed-subsidy rule is enforced
    pub const DEFAULT_ENFORCE_HEIGHT: i64 = 1;

    /// Default stratum extranonce1 size (informational, bytes)
    pub const DEFAULT_EXTRANONCE1_SIZE: u8 = 4;

    /// Chain name (short form for identifiers)
    pub const CHAIN_NAME: &str = "LYRA";

    /// Genesis timestamp (Unix timestamp)
    pub const GENESIS_TIMESTAMP: u64 = 1736339922;
}
