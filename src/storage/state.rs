//! Chain state management
//!
//! Height-indexed view of the active best chain: current tip height and
//! per-height block lookup. This is the chain-accessor surface the
//! loyalty engine consumes; full spend validation lives in the
//! surrounding engine, not here.

use std::collections::HashMap;
use crate::consensus::Block;
use crate::crypto::Hash;

/// The active best chain, indexed by height
#[derive(Debug, Default)]
pub struct ChainState {
    /// height -> block (a height can be absent after a failed db read)
    blocks: HashMap<i64, Block>,
    /// Highest connected height, -1 when empty
    tip_height: i64,
    /// Hash of the tip block
    tip_hash: Hash,
}

impl ChainState {
    /// Create an empty chain state
    pub fn new() -> Self {
        Self {
            blocks: HashMap::new(),
            tip_height: -1,
            tip_hash: Hash::zero(),
        }
    }

    /// Current tip height, -1 when no block is connected
    pub fn tip_height(&self) -> i64 {
        self.tip_height
    }

    pub fn tip_hash(&self) -> Hash {
        self.tip_hash
    }

    /// Block at a height, None if absent
    pub fn block_at(&self, height: i64) -> Option<&Block> {
        self.blocks.get(&height)
    }

    /// Connect a block at the next height; returns that height
    pub fn connect_block(&mut self, block: Block) -> i64 {
        let height = self.tip_height + 1;
        self.tip_hash = block.hash();
        self.blocks.insert(height, block);
        self.tip_height = height;
        height
    }

    /// Place a block at an explicit height (restart restore path)
    ///
    /// Advances the tip when the height extends it; gaps are allowed
    /// and surface later as rebuild skips.
    pub fn restore_block(&mut self, height: i64, block: Block) {
        if height > self.tip_height {
            self.tip_height = height;
            self.tip_hash = block.hash();
        }
        self.blocks.insert(height, block);
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{Block, BlockHeader, Script, Transaction, TxOutput};

    fn make_block(prev: Hash, stamp: u64) -> Block {
        Block::new(
            BlockHeader::new(1, prev, Hash::zero(), stamp, 0x1d00ffff, 0),
            vec![Transaction::coinbase(vec![TxOutput {
                value: 50,
                script_pubkey: Script::pay_to_pubkey_hash(&crate::crypto::hash_bytes(b"miner")),
            }])],
        )
    }

    #[test]
    fn test_empty_state() {
        let state = ChainState::new();
        assert_eq!(state.tip_height(), -1);
        assert!(state.block_at(0).is_none());
    }

    #[test]
    fn test_connect_assigns_heights_in_order() {
        let mut state = ChainState::new();
        let genesis = make_block(Hash::zero(), 0);
        assert_eq!(state.connect_block(genesis.clone()), 0);

        let next = make_block(genesis.hash(), 1);
        assert_eq!(state.connect_block(next.clone()), 1);

        assert_eq!(state.tip_height(), 1);
        assert_eq!(state.tip_hash(), next.hash());
        assert_eq!(state.block_at(0).unwrap().hash(), genesis.hash());
    }

    #[test]
    fn test_restore_with_gap() {
        let mut state = ChainState::new();
        state.restore_block(0, make_block(Hash::zero(), 0));
        state.restore_block(2, make_block(Hash::zero(), 2));

        assert_eq!(state.tip_height(), 2);
        assert!(state.block_at(1).is_none());
        assert_eq!(state.len(), 2);
    }
}
