use crate::data::storage::{BLOCKS_RESOURCE, ResourceStore, read_json};
use crate::data::types::{Block, CodePoint};
use crate::error::{Result, UcdError};

/// Ordered, immutable list of named blocks
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    blocks: Vec<Block>,
}

impl BlockIndex {
    /// Load the block list. A missing or malformed resource is fatal.
    pub fn load(store: &dyn ResourceStore) -> Result<Self> {
        let mut blocks: Vec<Block> = read_json(store, BLOCKS_RESOURCE)?
            .ok_or_else(|| UcdError::MissingResource(BLOCKS_RESOURCE.to_string()))?;
        blocks.sort_by_key(|b| b.first_code);
        Ok(Self { blocks })
    }

    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        blocks.sort_by_key(|b| b.first_code);
        Self { blocks }
    }

    /// Every block, in code order
    pub fn list(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks shown when browsing: private use and surrogates excluded
    pub fn listed(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_listed())
    }

    /// The block containing `code`, if any
    pub fn block_of(&self, code: CodePoint) -> Option<&Block> {
        let idx = self.blocks.partition_point(|b| b.last_code < code);
        self.blocks.get(idx).filter(|b| b.contains(code))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
