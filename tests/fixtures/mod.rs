//! Shared fixture resources for integration tests
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use unidex::data::storage::{BLOCKS_RESOURCE, EMOJI_RESOURCE, SEQUENCES_RESOURCE, chunk_resource_name};
use unidex::data::types::{Block, CharRecord, Sequence};
use unidex::data::{Chunk, DirStore, ResourceStore};

fn record(code: u32, name: &str, gc: &str, age: &str) -> CharRecord {
    let mut record = CharRecord::assigned(code, name, gc);
    record.age = Some(age.to_string());
    record
}

/// A handful of real characters covering every searchable property
pub fn fixture_records() -> Vec<CharRecord> {
    let mut superscript_two = record(0xB2, "SUPERSCRIPT TWO", "No", "1.1");
    superscript_two.decomposition = Some("2".to_string());

    let mut e_acute = record(0xE9, "LATIN SMALL LETTER E WITH ACUTE", "Ll", "1.1");
    e_acute.html_aliases = vec!["eacute".to_string()];
    e_acute.latex_aliases = vec!["\\'e".to_string(), "\\'{e}".to_string()];
    e_acute.cross_references = vec![0x65];

    let mut thumbs = record(0x1F44D, "THUMBS UP SIGN", "So", "6.0");
    thumbs.is_emoji = true;

    vec![
        record(0x0A, "<control> LINE FEED", "Cc", "1.1"),
        record(0x32, "DIGIT TWO", "Nd", "1.1"),
        record(0x41, "LATIN CAPITAL LETTER A", "Lu", "1.1"),
        record(0x61, "LATIN SMALL LETTER A", "Ll", "1.1"),
        superscript_two,
        e_acute,
        record(0x4E00, "CJK UNIFIED IDEOGRAPH-4E00", "Lo", "1.1"),
        thumbs,
    ]
}

pub fn fixture_sequences() -> Vec<Sequence> {
    let thumbs = |tone: u32, name: &str| Sequence {
        codes: vec![0x1F44D, tone],
        name: format!("THUMBS UP: {}", name),
        kind: Some("RGI Emoji Modifier Sequence".to_string()),
        age: Some("E1.0".to_string()),
    };
    vec![
        thumbs(0x1F3FB, "LIGHT SKIN TONE"),
        thumbs(0x1F3FC, "MEDIUM-LIGHT SKIN TONE"),
        Sequence {
            codes: vec![0x23, 0xFE0F, 0x20E3],
            name: "KEYCAP: #".to_string(),
            kind: Some("RGI Emoji Keycap Sequence".to_string()),
            age: Some("E0.6".to_string()),
        },
    ]
}

pub fn fixture_blocks() -> Vec<Block> {
    let block = |first_code: u32, last_code: u32, name: &str| Block {
        first_code,
        last_code,
        name: name.to_string(),
    };
    vec![
        block(0x0000, 0x007F, "Basic Latin"),
        block(0x0080, 0x00FF, "Latin-1 Supplement"),
        block(0x4E00, 0x9FFF, "CJK Unified Ideographs"),
        block(0xE000, 0xF8FF, "Private Use Area"),
        block(0x1F300, 0x1F5FF, "Miscellaneous Symbols and Pictographs"),
    ]
}

/// Write records as chunk files, plus blocks, emoji and sequences
pub fn write_resources(dir: &Path, records: &[CharRecord], blocks: &[Block], sequences: &[Sequence]) {
    let mut chunks: BTreeMap<u32, Vec<Option<CharRecord>>> = BTreeMap::new();
    for record in records {
        let entries = chunks.entry(record.code / 0x100).or_default();
        let offset = (record.code % 0x100) as usize;
        if entries.len() <= offset {
            entries.resize(offset + 1, None);
        }
        entries[offset] = Some(record.clone());
    }
    for (hundred, entries) in chunks {
        let chunk = Chunk::from_entries(hundred, entries).unwrap();
        fs::write(dir.join(chunk_resource_name(hundred)), chunk.to_json().unwrap()).unwrap();
    }

    let emoji: Vec<u32> = records.iter().filter(|r| r.is_emoji).map(|r| r.code).collect();
    fs::write(dir.join(EMOJI_RESOURCE), serde_json::to_vec(&emoji).unwrap()).unwrap();
    fs::write(dir.join(BLOCKS_RESOURCE), serde_json::to_vec(blocks).unwrap()).unwrap();
    fs::write(dir.join(SEQUENCES_RESOURCE), serde_json::to_vec(sequences).unwrap()).unwrap();
}

/// A temp resource directory holding the standard fixture
pub fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_resources(dir.path(), &fixture_records(), &fixture_blocks(), &fixture_sequences());
    dir
}

/// Directory store that counts reads per resource and can slow them down
pub struct CountingStore {
    inner: DirStore,
    reads: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl CountingStore {
    pub fn new(dir: &Path, delay: Duration) -> Self {
        Self {
            inner: DirStore::new(dir),
            reads: Mutex::new(HashMap::new()),
            delay,
        }
    }

    pub fn reads_of(&self, name: &str) -> usize {
        self.reads.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

impl ResourceStore for CountingStore {
    fn read(&self, name: &str) -> unidex::Result<Option<Vec<u8>>> {
        *self.reads.lock().unwrap().entry(name.to_string()).or_default() += 1;
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.inner.read(name)
    }

    fn describe(&self) -> String {
        format!("counting:{}", self.inner.describe())
    }
}
