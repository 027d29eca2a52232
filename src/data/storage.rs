//! Persisted resource layout and access.
//!
//! Everything the engine reads lives in one directory of JSON files:
//!
//! - `ucd.blocks.json` - ordered block list (required)
//! - `ucd.emoji.json` - code points with default emoji presentation
//! - `ucd.sequences.json` - named multi-code-point sequences
//! - `ucd.<HEX>.json` - one positional array per non-default chunk
//! - `palettes.json` - curated character sets (optional)

use crate::data::types::{CHUNK_SIZE, CharSet, CodePoint, to_hex};
use crate::error::{Result, UcdError};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const BLOCKS_RESOURCE: &str = "ucd.blocks.json";
pub const EMOJI_RESOURCE: &str = "ucd.emoji.json";
pub const SEQUENCES_RESOURCE: &str = "ucd.sequences.json";
pub const PALETTES_RESOURCE: &str = "palettes.json";

/// Resource name of the chunk holding `hundred * 0x100 ..`
pub fn chunk_resource_name(hundred: u32) -> String {
    format!("ucd.{}.json", to_hex(hundred * CHUNK_SIZE))
}

/// Read-only access to persisted resources by name
pub trait ResourceStore: Send + Sync {
    /// Read a resource; `Ok(None)` when it does not exist
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Human-readable location for log messages
    fn describe(&self) -> String;
}

/// Resources stored as files in a single directory
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceStore for DirStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(UcdError::io(name, e)),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Read and parse a JSON resource; `Ok(None)` when it does not exist
pub fn read_json<T: DeserializeOwned>(store: &dyn ResourceStore, name: &str) -> Result<Option<T>> {
    let Some(bytes) = store.read(name)? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| UcdError::MalformedResource {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

/// Emoji presentation code points; empty when the resource is absent
pub fn read_emoji_list(store: &dyn ResourceStore) -> Result<Vec<CodePoint>> {
    Ok(read_json(store, EMOJI_RESOURCE)?.unwrap_or_default())
}

/// Curated palettes; empty when the resource is absent
pub fn read_palettes(store: &dyn ResourceStore) -> Result<Vec<CharSet>> {
    Ok(read_json(store, PALETTES_RESOURCE)?.unwrap_or_default())
}
