//! Character data: types, persisted resources, and the lazily loaded store

pub mod blocks;
pub mod chunk_store;
pub mod labels;
pub mod sequences;
pub mod storage;
pub mod types;

pub use blocks::BlockIndex;
pub use chunk_store::{Chunk, ChunkState, ChunkStore, LoadedChunk};
pub use sequences::SequenceIndex;
pub use storage::{DirStore, ResourceStore};
pub use types::{Block, CharKind, CharRecord, CharSet, CodePoint, Sequence};
