use alloy_consensus::Header;
use alloy_primitives::{BlockNumber, Bytes};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is not valid json: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("block {0} is not cached")]
    MissingBlock(BlockNumber),
}

/// A block header with the EIP-2718 encoded receipts of every transaction in it, in
/// transaction order. Receipts stay encoded so any chain's receipt types round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CachedBlock {
    pub header: Header,
    pub receipts: Vec<Bytes>,
}

impl CachedBlock {
    pub fn new(header: Header, receipts: Vec<Bytes>) -> Self {
        Self { header, receipts }
    }

    pub fn number(&self) -> BlockNumber {
        self.header.number
    }
}

impl core::ops::Deref for CachedBlock {
    type Target = Header;

    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Store {
    pub blocks: BTreeMap<BlockNumber, CachedBlock>,
}

/// Fetched blocks, optionally backed by a json file.
#[derive(Debug, Default)]
pub struct Cache {
    pub store: Store,
    path: Option<PathBuf>,
}

impl Cache {
    /// Opens the cache file at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| CacheError::Io {
            path: path.clone(),
            source,
        };
        if !fs::exists(&path).map_err(io_err)? {
            return Ok(Self {
                store: Store::default(),
                path: Some(path),
            });
        }

        let json = fs::read_to_string(&path).map_err(io_err)?;
        let store: Store = serde_json::from_str(&json).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        info!(blocks = store.blocks.len(), path = %path.display(), "loaded block cache");
        Ok(Self {
            store,
            path: Some(path),
        })
    }

    /// Writes the cache back to its file. In memory caches are left untouched.
    pub fn save(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.store).map_err(|source| CacheError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, json).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        info!(blocks = self.store.blocks.len(), path = %path.display(), "saved block cache");
        Ok(())
    }

    pub fn insert_block(&mut self, block: CachedBlock) {
        self.store.blocks.insert(block.number(), block);
    }

    pub fn get_block(&self, number: BlockNumber) -> Option<&CachedBlock> {
        self.store.blocks.get(&number)
    }

    pub fn contains(&self, number: BlockNumber) -> bool {
        self.store.blocks.contains_key(&number)
    }
}

impl core::ops::Deref for Cache {
    type Target = Store;
    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_lib::{testing::ClaimFactory, ClaimConfig};
    use rand::{rngs::StdRng, SeedableRng};

    fn blocks(count: usize) -> Vec<CachedBlock> {
        let mut factory = ClaimFactory::new(ClaimConfig::default(), StdRng::seed_from_u64(3));
        factory.claims(count);
        factory
            .blocks()
            .into_iter()
            .map(|(header, receipts)| CachedBlock::new(header, receipts))
            .collect()
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path().join("blocks.json")).unwrap();
        assert!(cache.blocks.is_empty());
    }

    #[test]
    fn saved_blocks_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        let blocks = blocks(3);

        let mut cache = Cache::open(&path).unwrap();
        for block in blocks.iter().cloned() {
            cache.insert_block(block);
        }
        cache.save().unwrap();

        let reopened = Cache::open(&path).unwrap();
        assert_eq!(reopened.blocks.len(), 3);
        for block in &blocks {
            assert_eq!(reopened.get_block(block.number()), Some(block));
        }
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Cache::open(&path), Err(CacheError::Json { .. })));
    }

    #[test]
    fn in_memory_cache_does_not_write() {
        let mut cache = Cache::default();
        cache.insert_block(blocks(1).remove(0));
        assert!(cache.save().is_ok());
        assert_eq!(cache.blocks.len(), 1);
    }
}
