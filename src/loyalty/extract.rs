//! Coinbase tag extraction
//!
//! Pool software writes `OP_RETURN <push: "LYRATAG" + tag(4/8/12)>`
//! into one of the coinbase outputs. Extraction is pure: first
//! transaction only, outputs scanned in order, first match wins.

use crate::consensus::{Block, ScriptOp, OP_RETURN};
use crate::constants::TAG_PREFIX;
use crate::loyalty::{MinerTag, EMBEDDED_TAG_LENS};

/// Find the embedded miner tag in a block's coinbase, if any
pub fn extract_miner_tag(block: &Block) -> Option<MinerTag> {
    let coinbase = block.coinbase()?;
    if coinbase.outputs.is_empty() {
        return None;
    }

    for out in &coinbase.outputs {
        let mut ops = out.script_pubkey.ops();

        match ops.next() {
            Some(Ok(ScriptOp::Opcode(OP_RETURN))) => {}
            _ => continue,
        }

        let push = match ops.next() {
            Some(Ok(ScriptOp::Push(data))) => data,
            _ => continue,
        };

        if push.len() < TAG_PREFIX.len() + 4 {
            continue;
        }
        if !push.starts_with(&TAG_PREFIX) {
            continue;
        }

        let suffix = &push[TAG_PREFIX.len()..];
        if EMBEDDED_TAG_LENS.contains(&suffix.len()) {
            // from_bytes cannot fail for an accepted suffix length
            return MinerTag::from_bytes(suffix.to_vec()).ok();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::{Block, BlockHeader, Script, Transaction, TxOutput};
    use crate::crypto::{hash_bytes, Hash};

    fn block_with_coinbase_outputs(outputs: Vec<TxOutput>) -> Block {
        let header = BlockHeader::new(1, Hash::zero(), Hash::zero(), 0, 0, 0);
        Block::new(header, vec![Transaction::coinbase(outputs)])
    }

    fn tag_output(tag: &[u8]) -> TxOutput {
        let mut payload = TAG_PREFIX.to_vec();
        payload.extend_from_slice(tag);
        TxOutput {
            value: 0,
            script_pubkey: Script::op_return_push(&payload),
        }
    }

    #[test]
    fn test_extracts_each_valid_length() {
        for len in [4usize, 8, 12] {
            let tag = vec![0x5au8; len];
            let block = block_with_coinbase_outputs(vec![tag_output(&tag)]);
            let found = extract_miner_tag(&block).unwrap();
            assert_eq!(found.as_bytes(), &tag[..]);
        }
    }

    #[test]
    fn test_rejects_wrong_suffix_length() {
        let block = block_with_coinbase_outputs(vec![tag_output(&[1, 2, 3, 4, 5])]);
        assert!(extract_miner_tag(&block).is_none());
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        let mut payload = b"NOTLYRA".to_vec();
        payload.extend_from_slice(&[1, 2, 3, 4]);
        let block = block_with_coinbase_outputs(vec![TxOutput {
            value: 0,
            script_pubkey: Script::op_return_push(&payload),
        }]);
        assert!(extract_miner_tag(&block).is_none());
    }

    #[test]
    fn test_no_transactions_or_outputs() {
        let header = BlockHeader::new(1, Hash::zero(), Hash::zero(), 0, 0, 0);
        let empty = Block::new(header, vec![]);
        assert!(extract_miner_tag(&empty).is_none());

        let no_outputs = block_with_coinbase_outputs(vec![]);
        assert!(extract_miner_tag(&no_outputs).is_none());
    }

    #[test]
    fn test_skips_payout_output_then_matches() {
        let payout = TxOutput {
            value: 50,
            script_pubkey: Script::pay_to_pubkey_hash(&hash_bytes(b"miner")),
        };
        let block = block_with_coinbase_outputs(vec![payout, tag_output(&[9, 9, 9, 9])]);
        let found = extract_miner_tag(&block).unwrap();
        assert_eq!(found.as_bytes(), &[9, 9, 9, 9]);
    }

    #[test]
    fn test_first_matching_output_wins() {
        let block = block_with_coinbase_outputs(vec![
            tag_output(&[1, 1, 1, 1]),
            tag_output(&[2, 2, 2, 2]),
        ]);
        let found = extract_miner_tag(&block).unwrap();
        assert_eq!(found.as_bytes(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_only_coinbase_is_inspected() {
        let header = BlockHeader::new(1, Hash::zero(), Hash::zero(), 0, 0, 0);
        // Tag sits in the second transaction, not the coinbase
        let plain_cb = Transaction::coinbase(vec![TxOutput {
            value: 50,
            script_pubkey: Script::pay_to_pubkey_hash(&hash_bytes(b"miner")),
        }]);
        let mut payload = TAG_PREFIX.to_vec();
        payload.extend_from_slice(&[7, 7, 7, 7]);
        let other = Transaction::new(
            vec![],
            vec![TxOutput { value: 0, script_pubkey: Script::op_return_push(&payload) }],
        );
        let block = Block::new(header, vec![plain_cb, other]);
        assert!(extract_miner_tag(&block).is_none());
    }

    #[test]
    fn test_bare_op_return_without_push() {
        let block = block_with_coinbase_outputs(vec![TxOutput {
            value: 0,
            script_pubkey: Script::from_bytes(vec![crate::consensus::OP_RETURN]),
        }]);
        assert!(extract_miner_tag(&block).is_none());
    }
}
