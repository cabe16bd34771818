//! Miner tag identity
//!
//! A tag is the byte identity PoL tracks per miner. Two namespaces
//! coexist: raw 4/8/12-byte tags embedded in the coinbase OP_RETURN by
//! pool software, and canonical 12-byte tags derived by hashing a
//! payout address string or an output script. `TagSource` keeps the
//! derivation rule explicit at each call site.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::consensus::Script;
use crate::constants::POL_TAG_LEN;

/// Embedded tag lengths accepted from the coinbase marker
pub const EMBEDDED_TAG_LENS: [usize; 3] = [4, 8, 12];

/// Tag construction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("miner tag must be 4, 8 or 12 bytes, got {0}")]
    InvalidLength(usize),
    #[error("miner tag must be hex")]
    InvalidHex,
}

/// A miner's PoL identity, stored and compared as raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinerTag(Vec<u8>);

impl MinerTag {
    /// Accept raw tag bytes; only 4/8/12-byte tags are valid
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TagError> {
        if !EMBEDDED_TAG_LENS.contains(&bytes.len()) {
            return Err(TagError::InvalidLength(bytes.len()));
        }
        Ok(MinerTag(bytes))
    }

    /// Parse a tag from its hex rendering (8/16/24 hex chars)
    pub fn from_hex(tag_hex: &str) -> Result<Self, TagError> {
        if !matches!(tag_hex.len(), 8 | 16 | 24) {
            return Err(TagError::InvalidLength(tag_hex.len() / 2));
        }
        let bytes = hex::decode(tag_hex).map_err(|_| TagError::InvalidHex)?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex rendering, used as the ledger lookup key
    pub fn hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Little-endian u32 of the first 4 tag bytes (informational)
    pub fn as_u32_le(&self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for MinerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

/// Where a tag identity comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSource {
    /// Raw 4/8/12 bytes embedded after the coinbase marker prefix
    Embedded(Vec<u8>),
    /// Canonical tag12 of a payout address string (worker suffix stripped)
    DerivedFromAddress(String),
    /// Canonical tag12 of an output script's raw bytes
    DerivedFromScript(Vec<u8>),
}

impl TagSource {
    /// Resolve the source into a concrete tag
    pub fn resolve(&self) -> Result<MinerTag, TagError> {
        match self {
            TagSource::Embedded(bytes) => MinerTag::from_bytes(bytes.clone()),
            TagSource::DerivedFromAddress(addr) => Ok(tag12_from_address(addr)),
            TagSource::DerivedFromScript(bytes) => Ok(tag12_from_hash_input(bytes)),
        }
    }
}

/// First 12 bytes of SHA256 over arbitrary input
fn tag12_from_hash_input(data: &[u8]) -> MinerTag {
    let digest = Sha256::digest(data);
    MinerTag(digest[..POL_TAG_LEN].to_vec())
}

/// Canonical tag12 of an output script: SHA256(script-bytes)[..12]
pub fn tag12_from_script(script: &Script) -> MinerTag {
    tag12_from_hash_input(script.as_bytes())
}

/// Canonical tag12 of a payout address string: SHA256(ascii)[..12]
///
/// Anything after the first '.' is a stratum worker-name suffix and is
/// not part of the identity.
pub fn tag12_from_address(address: &str) -> MinerTag {
    let base = match address.find('.') {
        Some(dot) => &address[..dot],
        None => address,
    };
    tag12_from_hash_input(base.as_bytes())
}
