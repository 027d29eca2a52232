//! Request handling over the character store.
//!
//! `UnicodeService` owns everything loaded at startup and answers protocol
//! requests. It is shared by reference across connection threads; all
//! mutable state lives inside the `ChunkStore`.

use crate::data::storage::{DirStore, ResourceStore, read_emoji_list, read_palettes};
use crate::data::types::{CharRecord, CharSet, CodePoint, Sequence};
use crate::data::{BlockIndex, ChunkStore, SequenceIndex};
use crate::error::Result;
use crate::query::{SearchEngine, SearchResult};
use crate::server::protocol::{
    CharInfo, CharName, InitResponse, Request, Response, SearchResponse, StatusResponse,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct UnicodeService {
    store: Arc<ChunkStore>,
    blocks: BlockIndex,
    sequences: SequenceIndex,
    emoji: Vec<CodePoint>,
    palettes: Vec<CharSet>,
}

impl UnicodeService {
    /// Load the startup resources; chunks stay unloaded until requested
    pub fn open(resources: Arc<dyn ResourceStore>, parallel_loading: bool) -> Result<Self> {
        let blocks = BlockIndex::load(resources.as_ref())?;
        let sequences = SequenceIndex::load(resources.as_ref())?;
        let emoji = read_emoji_list(resources.as_ref())?;
        let palettes = read_palettes(resources.as_ref())?;

        info!(
            resources = %resources.describe(),
            blocks = blocks.len(),
            sequences = sequences.len(),
            emoji = emoji.len(),
            palettes = palettes.len(),
            "resources opened"
        );

        let store = ChunkStore::new(resources).with_parallel_loading(parallel_loading);
        Ok(Self {
            store: Arc::new(store),
            blocks,
            sequences,
            emoji,
            palettes,
        })
    }

    /// Open a resource directory
    pub fn open_dir(dir: &Path, parallel_loading: bool) -> Result<Self> {
        Self::open(Arc::new(DirStore::new(dir)), parallel_loading)
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn blocks(&self) -> &BlockIndex {
        &self.blocks
    }

    pub fn sequences(&self) -> &SequenceIndex {
        &self.sequences
    }

    pub fn init(&self) -> InitResponse {
        InitResponse {
            blocks: self.blocks.list().to_vec(),
            emoji: self.emoji.clone(),
            sequences: self.sequences.all().to_vec(),
            palettes: self.palettes.clone(),
        }
    }

    /// A record with its display labels and block
    pub fn char_info(&self, code: CodePoint) -> Result<CharInfo> {
        let record = self.store.get_character(code)?;
        Ok(CharInfo {
            age_label: record.age_label().map(str::to_string),
            category_label: record.category_label().map(str::to_string),
            block: self.blocks.block_of(code).map(|b| b.name.clone()),
            char: record,
        })
    }

    pub fn char_name(&self, code: CodePoint) -> Result<CharName> {
        let record = self.store.get_character(code)?;
        Ok(CharName {
            code,
            name: record.name,
            is_emoji: record.is_emoji,
        })
    }

    pub fn row(&self, code: CodePoint) -> Result<Vec<CharRecord>> {
        self.store.get_row(code)
    }

    /// Load every chunk ahead of the first search
    pub fn warm(&self) -> Result<Duration> {
        let start = Instant::now();
        self.store.ensure_all_loaded()?;
        Ok(start.elapsed())
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        SearchEngine::new(&self.store, &self.sequences).search(query)
    }

    /// Other members of the variant family of `codes`
    pub fn variants(&self, codes: &[CodePoint]) -> Option<Vec<Sequence>> {
        self.sequences
            .find_variants(codes)
            .map(|found| found.into_iter().cloned().collect())
    }

    /// Status without server counters
    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            uptime_secs: 0,
            requests_served: 0,
            searches_served: 0,
            cache_hit_rate: 0.0,
            chunks_loaded: self.store.loaded_count(),
            chunk_reads: self.store.read_count(),
            resources: self.store.describe(),
        }
    }

    /// Answer one request. Failures become `Response::Error` and leave
    /// other requests unaffected.
    pub fn handle(&self, request: Request) -> Response {
        debug!(?request, "handling request");
        let result = match request {
            Request::Init => Ok(Response::Init(self.init())),
            Request::GetChar { code } => self.char_info(code).map(Response::Char),
            Request::GetCharName { code } => self.char_name(code).map(Response::CharName),
            Request::GetRow { code } => self.row(code).map(|chars| Response::Row { chars }),
            Request::InitSearch => self.warm().map(|elapsed| Response::SearchReady {
                duration_ms: elapsed.as_secs_f64() * 1000.0,
            }),
            Request::Search { query } => {
                let start = Instant::now();
                self.search(&query).map(|results| {
                    Response::Search(SearchResponse {
                        results,
                        duration_ms: start.elapsed().as_secs_f64() * 1000.0,
                        cached: false,
                    })
                })
            }
            Request::GetVariants { codes } => Ok(Response::Variants {
                variants: self.variants(&codes),
            }),
            Request::Status => Ok(Response::Status(self.status())),
            Request::Shutdown => Ok(Response::ShuttingDown),
            Request::Ping => Ok(Response::Pong),
        };

        result.unwrap_or_else(|e| Response::Error {
            message: e.to_string(),
        })
    }
}

