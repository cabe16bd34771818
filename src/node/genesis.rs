//! Genesis block generation for the LYRA blockchain
//!
//! Creates the immutable genesis block. Genesis carries no subsidy and
//! no miner tag; PoL tracking starts at the configured start height.

use crate::consensus::{Block, BlockHeader, Script, Transaction, TxOutput};
use crate::constants::{CHAIN_NAME, GENESIS_TIMESTAMP};
use crate::crypto::{hash_bytes, Hash};

/// Initial difficulty target (easy for genesis)
const GENESIS_DIFFICULTY: u32 = 0x1e00ffff;

/// Genesis block version
const GENESIS_VERSION: u32 = 1;

/// Create the genesis block
///
/// This function produces a reproducible, byte-for-byte identical
/// genesis block. It MUST be called exactly once at chain
/// initialization.
pub fn create_genesis_block() -> Block {
    // A zero-value data output naming the chain; provably unspendable
    let genesis_tx = Transaction::coinbase(vec![TxOutput {
        value: 0,
        script_pubkey: Script::op_return_push(CHAIN_NAME.as_bytes()),
    }]);

    let merkle_root = genesis_tx.hash();

    let header = BlockHeader::new(
        GENESIS_VERSION,
        Hash::zero(),
        merkle_root,
        GENESIS_TIMESTAMP,
        GENESIS_DIFFICULTY,
        0,
    );

    Block::new(header, vec![genesis_tx])
}

/// Stable identifier of the chain instance
pub fn genesis_chain_id() -> Hash {
    hash_bytes(&create_genesis_block().header.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::extract_miner_tag;

    #[test]
    fn test_genesis_determinism() {
        let genesis1 = create_genesis_block();
        let genesis2 = create_genesis_block();

        assert_eq!(genesis1.hash(), genesis2.hash());
        assert_eq!(genesis1.header.merkle_root, genesis2.header.merkle_root);
        assert_eq!(genesis1.header.timestamp, genesis2.header.timestamp);
    }

    #[test]
    fn test_genesis_shape() {
        let genesis = create_genesis_block();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.transactions.len(), 1);
        assert!(genesis.transactions[0].is_coinbase());
        assert_eq!(genesis.transactions[0].total_output_value(), 0);
        // The chain-name data output is not a miner tag
        assert!(extract_miner_tag(&genesis).is_none());
    }
}
