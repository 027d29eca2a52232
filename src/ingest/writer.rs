//! Write the ingested table out as store resources

use crate::data::Chunk;
use crate::data::storage::{BLOCKS_RESOURCE, EMOJI_RESOURCE, SEQUENCES_RESOURCE, chunk_resource_name};
use crate::data::types::{Block, CHUNK_SIZE, CharRecord, Sequence, hundred_of};
use crate::ingest::CharTable;
use crate::utils::progress::stage_bar;
use anyhow::{Context, Result};
use rayon::prelude::*;
use roaring::RoaringBitmap;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value).with_context(|| format!("Failed to encode {}", name))?;
    fs::write(dir.join(name), bytes).with_context(|| format!("Failed to write {}", name))
}

/// Positional entries for one hundred.
///
/// Every gap becomes an explicit synthesized record so the written chunk
/// is complete.
fn chunk_entries(table: &CharTable, hundred: u32) -> Vec<Option<CharRecord>> {
    let base = hundred * CHUNK_SIZE;
    (base..base + CHUNK_SIZE)
        .map(|code| Some(table.get(code).cloned().unwrap_or_else(|| CharRecord::synthesize(code))))
        .collect()
}

/// Write every resource; returns the number of chunk files written.
///
/// Only hundreds holding at least one assigned character get a chunk file.
pub fn write_resources(
    out_dir: &Path,
    table: &CharTable,
    blocks: &[Block],
    emoji: &RoaringBitmap,
    sequences: &[Sequence],
    show_progress: bool,
) -> Result<usize> {
    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    write_json(out_dir, BLOCKS_RESOURCE, blocks)?;
    write_json(out_dir, EMOJI_RESOURCE, &emoji.iter().collect::<Vec<u32>>())?;
    write_json(out_dir, SEQUENCES_RESOURCE, sequences)?;

    let mut hundreds: Vec<u32> = table.records().map(|r| hundred_of(r.code)).collect();
    hundreds.dedup();

    let bar = stage_bar(hundreds.len() as u64, "chunks", show_progress);
    hundreds.par_iter().try_for_each(|&hundred| -> Result<()> {
        let name = chunk_resource_name(hundred);
        let chunk = Chunk::from_entries(hundred, chunk_entries(table, hundred))
            .with_context(|| format!("Invalid chunk {}", name))?;
        let bytes = chunk.to_json().with_context(|| format!("Failed to encode {}", name))?;
        fs::write(out_dir.join(&name), bytes).with_context(|| format!("Failed to write {}", name))?;
        bar.inc(1);
        Ok(())
    })?;
    bar.finish_with_message("written");

    debug!(chunks = hundreds.len(), dir = %out_dir.display(), "resources written");
    Ok(hundreds.len())
}
