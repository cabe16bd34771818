//! Output scripts
//!
//! LYRA keeps Bitcoin's serialized script form for coinbase outputs so
//! that pool software can embed the PoL miner tag with a standard
//! OP_RETURN push. Only the opcode framing is interpreted here; script
//! execution is out of scope for this crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marks an output as provably unspendable data carrier
pub const OP_RETURN: u8 = 0x6a;
/// Push the next byte's worth of length, then that many bytes
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Two-byte little-endian length prefix
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Four-byte little-endian length prefix
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Scripts larger than this are unspendable by rule
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Script decoding errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("push opcode runs past end of script")]
    TruncatedPush,
    #[error("push length prefix runs past end of script")]
    TruncatedLength,
}

/// A single decoded script operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOp {
    /// A data push (direct push or OP_PUSHDATA1/2/4)
    Push(Vec<u8>),
    /// Any non-push opcode, by raw byte value
    Opcode(u8),
}

/// A serialized output script
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Script(pub Vec<u8>);

impl Script {
    /// Build a script from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    /// Build `OP_RETURN <push: data>` (the coinbase tag carrier shape)
    pub fn op_return_push(data: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(data.len() + 4);
        bytes.push(OP_RETURN);
        push_data(&mut bytes, data);
        Script(bytes)
    }

    /// Build a payout script: a single push of the recipient key hash
    pub fn pay_to_pubkey_hash(pubkey_hash: &crate::crypto::Hash) -> Self {
        let mut bytes = Vec::with_capacity(pubkey_hash.0.len() + 1);
        push_data(&mut bytes, &pubkey_hash.0);
        Script(bytes)
    }

    /// Raw script bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this output can never be spent (data carrier or oversized)
    pub fn is_unspendable(&self) -> bool {
        (!self.0.is_empty() && self.0[0] == OP_RETURN) || self.0.len() > MAX_SCRIPT_SIZE
    }

    /// Iterate over decoded operations in order
    pub fn ops(&self) -> ScriptOps<'_> {
        ScriptOps { bytes: &self.0, pos: 0 }
    }
}

/// Append a minimally-encoded data push to a script buffer
fn push_data(buf: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        n if n < OP_PUSHDATA1 as usize => buf.push(n as u8),
        n if n <= u8::MAX as usize => {
            buf.push(OP_PUSHDATA1);
            buf.push(n as u8);
        }
        n if n <= u16::MAX as usize => {
            buf.push(OP_PUSHDATA2);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        n => {
            buf.push(OP_PUSHDATA4);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
    }
    buf.extend_from_slice(data);
}

/// Decoding iterator over a script's operations
pub struct ScriptOps<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for ScriptOps<'a> {
    type Item = Result<ScriptOp, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        let opcode = self.bytes[self.pos];
        self.pos += 1;

        let push_len = match opcode {
            // 0x00 is OP_0: a push of the empty byte string
            0x00 => Some(0usize),
            n @ 0x01..=0x4b => Some(n as usize),
            OP_PUSHDATA1 => match self.read_le(1) {
                Some(n) => Some(n),
                None => return Some(Err(ScriptError::TruncatedLength)),
            },
            OP_PUSHDATA2 => match self.read_le(2) {
                Some(n) => Some(n),
                None => return Some(Err(ScriptError::TruncatedLength)),
            },
            OP_PUSHDATA4 => match self.read_le(4) {
                Some(n) => Some(n),
                None => return Some(Err(ScriptError::TruncatedLength)),
            },
            _ => None,
        };

        match push_len {
            None => Some(Ok(ScriptOp::Opcode(opcode))),
            Some(len) => {
                if self.pos + len > self.bytes.len() {
                    self.pos = self.bytes.len();
                    return Some(Err(ScriptError::TruncatedPush));
                }
                let data = self.bytes[self.pos..self.pos + len].to_vec();
                self.pos += len;
                Some(Ok(ScriptOp::Push(data)))
            }
        }
    }
}

impl<'a> ScriptOps<'a> {
    /// Read an n-byte little-endian length prefix at the cursor
    fn read_le(&mut self, n: usize) -> Option<usize> {
        if self.pos + n > self.bytes.len() {
            self.pos = self.bytes.len();
            return None;
        }
        let mut len = 0usize;
        for i in 0..n {
            len |= (self.bytes[self.pos + i] as usize) << (8 * i);
        }
        self.pos += n;
        Some(len)
    }
}
