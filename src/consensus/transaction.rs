//! Transaction structure
//!
//! Script-output transactions. Signature checking and general spend
//! validation are handled by the surrounding validation engine, not by
//! this crate; the structures here carry what the PoL engine reads.

use serde::{Deserialize, Serialize};
use crate::consensus::Script;
use crate::crypto::{hash_bytes, Hash};

/// A transaction input referencing a previous output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Hash of the transaction containing the output
    pub prev_tx_hash: Hash,
    /// Index of the output in that transaction
    pub output_index: u32,
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Amount in base units (satoshi-equivalent)
    pub value: u64,
    /// Spending conditions (or OP_RETURN data carrier)
    pub script_pubkey: Script,
}

/// A complete transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction version
    pub version: u32,
    /// Transaction inputs
    pub inputs: Vec<TxInput>,
    /// Transaction outputs
    pub outputs: Vec<TxOutput>,
    /// Lock time (block height or timestamp)
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Create a coinbase transaction (mining reward)
    pub fn coinbase(outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            inputs: vec![TxInput {
                prev_tx_hash: Hash::zero(),
                output_index: 0xFFFFFFFF,
            }],
            outputs,
            lock_time: 0,
        }
    }

    /// Check if this is a coinbase transaction
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_tx_hash == Hash::zero()
            && self.inputs[0].output_index == 0xFFFFFFFF
    }

    /// Calculate transaction hash
    pub fn hash(&self) -> Hash {
        hash_bytes(&self.to_bytes())
    }

    /// Calculate total output value
    pub fn total_output_value(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }

    /// Canonical serialization for hashing
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.version.to_le_bytes());

        bytes.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            bytes.extend_from_slice(&input.prev_tx_hash.0);
            bytes.extend_from_slice(&input.output_index.to_le_bytes());
        }

        bytes.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            bytes.extend_from_slice(&output.value.to_le_bytes());
            bytes.extend_from_slice(&(output.script_pubkey.0.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&output.script_pubkey.0);
        }

        bytes.extend_from_slice(&self.lock_time.to_le_bytes());

        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coinbase_detection() {
        let coinbase = Transaction::coinbase(vec![TxOutput {
            value: 5000,
            script_pubkey: Script::pay_to_pubkey_hash(&hash_bytes(b"miner")),
        }]);
        assert!(coinbase.is_coinbase());

        let regular = Transaction::new(vec![], vec![]);
        assert!(!regular.is_coinbase());
    }

    #[test]
    fn test_transaction_hash_deterministic() {
        let tx = Transaction::coinbase(vec![TxOutput {
            value: 5000,
            script_pubkey: Script::op_return_push(b"data"),
        }]);
        assert_eq!(tx.hash(), tx.hash());
    }

    #[test]
    fn test_output_value_calculation() {
        let tx = Transaction::new(
            vec![],
            vec![
                TxOutput { value: 100, script_pubkey: Script::default() },
                TxOutput { value: 200, script_pubkey: Script::default() },
            ],
        );
        assert_eq!(tx.total_output_value(), 300);
    }

    #[test]
    fn test_hash_covers_scripts() {
        let a = Transaction::coinbase(vec![TxOutput {
            value: 100,
            script_pubkey: Script::op_return_push(b"one"),
        }]);
        let b = Transaction::coinbase(vec![TxOutput {
            value: 100,
            script_pubkey: Script::op_return_push(b"two"),
        }]);
        assert_ne!(a.hash(), b.hash());
    }
}
