//! Database persistence layer using Sled
//!
//! Blocks are stored keyed by big-endian height so the restart path can
//! stream them back in order and rebuild the loyalty ledger.

use sled::{Db, Tree};
use std::path::Path;
use thiserror::Error;

use crate::consensus::Block;

const TIP_HEIGHT_KEY: &str = "tip_height";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("codec error: {0}")]
    Codec(#[from] Box<bincode::ErrorKind>),
    #[error("corrupt key in blocks tree")]
    CorruptKey,
}

/// Database wrapper
#[derive(Debug, Clone)]
pub struct ChainDb {
    db: Db,
    blocks_tree: Tree,
    metadata_tree: Tree,
}

impl ChainDb {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let blocks_tree = db.open_tree("blocks")?;
        let metadata_tree = db.open_tree("metadata")?;

        Ok(Self {
            db,
            blocks_tree,
            metadata_tree,
        })
    }

    /// Save a block at a height and advance the stored tip
    pub fn save_block(&self, height: i64, block: &Block) -> Result<(), StorageError> {
        let value = bincode::serialize(block)?;
        self.blocks_tree.insert(height.to_be_bytes(), value)?;
        self.metadata_tree
            .insert(TIP_HEIGHT_KEY, &height.to_be_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    /// Get a block by height
    pub fn block_at(&self, height: i64) -> Result<Option<Block>, StorageError> {
        match self.blocks_tree.get(height.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Stored tip height, -1 when the database is empty
    pub fn tip_height(&self) -> Result<i64, StorageError> {
        match self.metadata_tree.get(TIP_HEIGHT_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.as_ref().try_into().map_err(|_| StorageError::CorruptKey)?;
                Ok(i64::from_be_bytes(arr))
            }
            None => Ok(-1),
        }
    }

    /// Stream all stored blocks in height order
    pub fn load_blocks(&self) -> Result<Vec<(i64, Block)>, StorageError> {
        let mut out = Vec::new();
        for entry in self.blocks_tree.iter() {
            let (key, value) = entry?;
            let arr: [u8; 8] = key.as_ref().try_into().map_err(|_| StorageError::CorruptKey)?;
            let height = i64::from_be_bytes(arr);
            let block: Block = bincode::deserialize(&value)?;
            out.push((height, block));
        }
        Ok(out)
    }
}
