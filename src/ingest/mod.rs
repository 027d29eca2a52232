//! Offline pipeline turning raw Unicode data files into the resource
//! directory the store reads.
//!
//! Expected inputs under the raw directory (only `UnicodeData.txt` and
//! `Blocks.txt` are required):
//!
//! - `UnicodeData.txt`, `NameAliases.txt`, `DerivedAge.txt`, `Blocks.txt`
//! - `NamesList.txt`
//! - `Unihan_Readings.txt`, `Unihan_Variants.txt`
//! - `emoji-data.txt`, `emoji-sequences.txt`, `emoji-zwj-sequences.txt`
//! - `html.json`, `latex.json`

pub mod aliases;
pub mod emoji;
pub mod ucd;
pub mod unihan;
pub mod writer;

use crate::data::types::{CharRecord, CodePoint};
use crate::utils::progress::stage_bar;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Assigned characters collected during ingestion, ordered by code point
#[derive(Debug, Default)]
pub struct CharTable {
    records: BTreeMap<CodePoint, CharRecord>,
}

impl CharTable {
    pub fn insert(&mut self, record: CharRecord) {
        self.records.insert(record.code, record);
    }

    pub fn get(&self, code: CodePoint) -> Option<&CharRecord> {
        self.records.get(&code)
    }

    pub fn get_mut(&mut self, code: CodePoint) -> Option<&mut CharRecord> {
        self.records.get_mut(&code)
    }

    /// Records with `first <= code <= last`
    pub fn range_mut(&mut self, first: CodePoint, last: CodePoint) -> impl Iterator<Item = &mut CharRecord> {
        self.records.range_mut(first..=last).map(|(_, record)| record)
    }

    pub fn records(&self) -> impl Iterator<Item = &CharRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where to read raw data and where to write resources
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub raw_dir: PathBuf,
    pub out_dir: PathBuf,
    pub show_progress: bool,
}

/// Counts reported after a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub characters: usize,
    pub blocks: usize,
    pub emoji: usize,
    pub sequences: usize,
    pub chunks_written: usize,
}

fn read_required(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read an optional input; `None` (with a debug line) when it is missing
fn read_optional(dir: &Path, name: &str) -> Result<Option<String>> {
    let path = dir.join(name);
    if !path.exists() {
        debug!(file = name, "optional input missing, skipping");
        return Ok(None);
    }
    read_required(dir, name).map(Some)
}

/// Run the whole pipeline
pub fn run(options: &IngestOptions) -> Result<IngestSummary> {
    let start = Instant::now();
    let raw = options.raw_dir.as_path();
    info!(raw = %raw.display(), out = %options.out_dir.display(), "ingesting");

    let stages = stage_bar(6, "ingest", options.show_progress);
    let mut table = CharTable::default();

    stages.set_message("characters");
    let name_aliases = match read_optional(raw, "NameAliases.txt")? {
        Some(text) => ucd::parse_name_aliases(&text)?,
        None => FxHashMap::default(),
    };
    let characters = ucd::parse_unicode_data(&read_required(raw, "UnicodeData.txt")?, &name_aliases, &mut table)?;
    if let Some(text) = read_optional(raw, "DerivedAge.txt")? {
        ucd::apply_derived_age(&text, &mut table)?;
    }
    let blocks = ucd::parse_blocks(&read_required(raw, "Blocks.txt")?)?;
    stages.inc(1);

    stages.set_message("names list");
    if let Some(text) = read_optional(raw, "NamesList.txt")? {
        ucd::apply_names_list(&text, &mut table);
    }
    stages.inc(1);

    stages.set_message("unihan");
    if let Some(text) = read_optional(raw, "Unihan_Readings.txt")? {
        unihan::apply_readings(&text, &mut table);
    }
    if let Some(text) = read_optional(raw, "Unihan_Variants.txt")? {
        unihan::apply_variants(&text, &mut table);
    }
    unihan::close_variants(&mut table);
    stages.inc(1);

    stages.set_message("emoji");
    let emoji = match read_optional(raw, "emoji-data.txt")? {
        Some(text) => emoji::parse_emoji_presentation(&text)?,
        None => Default::default(),
    };
    emoji::mark_emoji(&emoji, &mut table);
    let mut sequences = Vec::new();
    for name in ["emoji-sequences.txt", "emoji-zwj-sequences.txt"] {
        if let Some(text) = read_optional(raw, name)? {
            sequences.extend(emoji::parse_sequences(&text));
        }
    }
    stages.inc(1);

    stages.set_message("aliases");
    if let Some(text) = read_optional(raw, "html.json")? {
        aliases::apply_html(&text, &mut table).context("Failed to apply html.json")?;
    }
    if let Some(text) = read_optional(raw, "latex.json")? {
        aliases::apply_latex(&text, &mut table).context("Failed to apply latex.json")?;
    }
    stages.inc(1);

    stages.set_message("writing");
    let chunks_written = writer::write_resources(
        &options.out_dir,
        &table,
        &blocks,
        &emoji,
        &sequences,
        options.show_progress,
    )?;
    stages.inc(1);
    stages.finish_with_message("done");

    let summary = IngestSummary {
        characters,
        blocks: blocks.len(),
        emoji: emoji.len() as usize,
        sequences: sequences.len(),
        chunks_written,
    };
    info!(
        characters = summary.characters,
        chunks = summary.chunks_written,
        sequences = summary.sequences,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ingest complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChunkStore, DirStore, SequenceIndex};
    use std::sync::Arc;
    use tempfile::tempdir;

    const UNICODE_DATA: &str = "\
000A;<control>;Cc;0;B;;;;;N;LINE FEED (LF);;;;
0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;
0042;LATIN CAPITAL LETTER B;Lu;0;L;;;;;N;;;;0062;
4E00;CJK UNIFIED IDEOGRAPH-4E00;Lo;0;L;;;;;N;;;;;
1F600;GRINNING FACE;So;0;ON;;;;;N;;;;;
";

    const BLOCKS: &str = "0000..007F; Basic Latin\n4E00..9FFF; CJK Unified Ideographs\n1F600..1F64F; Emoticons\n";

    #[test]
    fn test_run_minimal_inputs() {
        let raw = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(raw.path().join("UnicodeData.txt"), UNICODE_DATA).unwrap();
        fs::write(raw.path().join("Blocks.txt"), BLOCKS).unwrap();
        fs::write(raw.path().join("emoji-data.txt"), "1F600 ; Emoji_Presentation # E1.0 [1] (😀)\n").unwrap();
        fs::write(
            raw.path().join("emoji-zwj-sequences.txt"),
            "1F441 200D 1F5E8 ; RGI_Emoji_ZWJ_Sequence ; eye in speech bubble # E2.0 [1] (👁‍🗨)\n",
        )
        .unwrap();

        let summary = run(&IngestOptions {
            raw_dir: raw.path().to_path_buf(),
            out_dir: out.path().to_path_buf(),
            show_progress: false,
        })
        .unwrap();

        assert_eq!(summary.characters, 5);
        assert_eq!(summary.blocks, 3);
        assert_eq!(summary.emoji, 1);
        assert_eq!(summary.sequences, 1);
        assert_eq!(summary.chunks_written, 3);

        let resources = Arc::new(DirStore::new(out.path()));
        let store = ChunkStore::new(resources.clone());
        assert_eq!(store.get_character(0x0A).unwrap().name.as_deref(), Some("<control> LINE FEED"));
        assert!(store.get_character(0x1F600).unwrap().is_emoji);
        // gaps inside written chunks are explicit reserved records
        assert_eq!(store.get_character(0x43).unwrap().general_category, "Cn");

        let sequences = SequenceIndex::load(resources.as_ref()).unwrap();
        let bubble = sequences.find(&[0x1F441, 0x200D, 0x1F5E8]).unwrap();
        assert_eq!(bubble.name, "EYE IN SPEECH BUBBLE");
    }

    #[test]
    fn test_run_missing_required_input() {
        let raw = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(raw.path().join("Blocks.txt"), BLOCKS).unwrap();

        let err = run(&IngestOptions {
            raw_dir: raw.path().to_path_buf(),
            out_dir: out.path().to_path_buf(),
            show_progress: false,
        })
        .unwrap_err();
        assert!(err.to_string().contains("UnicodeData.txt"));
    }
}
