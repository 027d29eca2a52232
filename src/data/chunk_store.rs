//! Lazily loaded, chunked character store.
//!
//! The code space is split into 0x1100 chunks of 256 code points. A chunk is
//! read from its persisted resource the first time any code point in it is
//! requested, and kept for the life of the store.
//!
//! ## Coalescing
//!
//! At most one load is in flight per chunk. The first caller to find a chunk
//! absent performs the read on its own thread; every caller arriving while
//! that read is running is queued as a waiter and released, in arrival order,
//! with the same result. Once loaded, lookups go through a `OnceLock` and
//! take no lock at all.
//!
//! A chunk with no persisted resource is "sparse": all of its records are
//! synthesized from the range rules in [`CharRecord::synthesize`].

use crate::data::storage::{ResourceStore, chunk_resource_name};
use crate::data::types::{
    CHUNK_SIZE, CharKind, CharRecord, CodePoint, HUNDRED_COUNT, MAX_CODE, ROW_SIZE, check_code,
    hundred_of, is_surrogate,
};
use crate::error::{Result, UcdError};
use rayon::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Observable state of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Never requested
    Absent,
    /// A load is in flight
    Loading,
    /// No persisted resource; records are synthesized
    LoadedSparse,
    /// Persisted records are resident
    LoadedDense,
}

/// Records of one persisted chunk, by offset within the chunk.
///
/// `None` entries are gaps; lookups there fall back to the range rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    hundred: u32,
    entries: Vec<Option<CharRecord>>,
}

impl Chunk {
    /// Decode a persisted chunk resource
    pub fn from_json(hundred: u32, bytes: &[u8]) -> Result<Self> {
        let entries: Vec<Option<CharRecord>> =
            serde_json::from_slice(bytes).map_err(|e| UcdError::MalformedChunk {
                hundred,
                reason: e.to_string(),
            })?;
        Self::from_entries(hundred, entries)
    }

    /// Build a chunk from positional entries, validating every record
    pub fn from_entries(hundred: u32, entries: Vec<Option<CharRecord>>) -> Result<Self> {
        let malformed = |reason: String| UcdError::MalformedChunk { hundred, reason };

        if hundred >= HUNDRED_COUNT {
            return Err(malformed("chunk index past the end of the code space".into()));
        }
        if entries.len() > CHUNK_SIZE as usize {
            return Err(malformed(format!("{} entries, at most 256 allowed", entries.len())));
        }

        let base = hundred * CHUNK_SIZE;
        for (offset, entry) in entries.iter().enumerate() {
            let Some(record) = entry else { continue };
            let expected = base + offset as u32;
            if record.code != expected {
                return Err(malformed(format!(
                    "entry {} holds U+{:04X}, expected U+{:04X}",
                    offset, record.code, expected
                )));
            }
            if record.kind == CharKind::Assigned && record.general_category.is_empty() {
                return Err(malformed(format!(
                    "assigned U+{:04X} has no general category",
                    record.code
                )));
            }
        }

        Ok(Self { hundred, entries })
    }

    /// Encode in the persisted format
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.entries)
    }

    pub fn hundred(&self) -> u32 {
        self.hundred
    }

    /// The persisted record for `code`, if there is one
    pub fn get(&self, code: CodePoint) -> Option<&CharRecord> {
        if hundred_of(code) != self.hundred {
            return None;
        }
        self.entries
            .get((code % CHUNK_SIZE) as usize)
            .and_then(Option::as_ref)
    }

    /// Persisted records in code order, skipping gaps
    pub fn records(&self) -> impl Iterator<Item = &CharRecord> {
        self.entries.iter().flatten()
    }

    /// Positional entries as persisted
    pub fn entries(&self) -> &[Option<CharRecord>] {
        &self.entries
    }
}

/// A chunk that has completed its load transition
#[derive(Debug)]
pub enum LoadedChunk {
    Sparse(u32),
    Dense(Chunk),
}

impl LoadedChunk {
    /// The record for `code`: persisted if present, synthesized otherwise
    pub fn record(&self, code: CodePoint) -> CharRecord {
        match self {
            LoadedChunk::Dense(chunk) => chunk
                .get(code)
                .cloned()
                .unwrap_or_else(|| CharRecord::synthesize(code)),
            LoadedChunk::Sparse(_) => CharRecord::synthesize(code),
        }
    }

    pub fn dense(&self) -> Option<&Chunk> {
        match self {
            LoadedChunk::Dense(chunk) => Some(chunk),
            LoadedChunk::Sparse(_) => None,
        }
    }

    pub fn state(&self) -> ChunkState {
        match self {
            LoadedChunk::Dense(_) => ChunkState::LoadedDense,
            LoadedChunk::Sparse(_) => ChunkState::LoadedSparse,
        }
    }
}

type LoadResult = Result<Arc<LoadedChunk>>;

/// A caller parked on an in-flight load
struct Waiter {
    id: u64,
    tx: SyncSender<LoadResult>,
}

/// Per-chunk state. `loaded` is the lock-free read path; `inflight` holds
/// the waiter queue while a load is running and is `None` otherwise.
struct Slot {
    loaded: OnceLock<Arc<LoadedChunk>>,
    inflight: Mutex<Option<VecDeque<Waiter>>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            loaded: OnceLock::new(),
            inflight: Mutex::new(None),
        }
    }
}

/// What a caller must do after inspecting a slot
enum Ticket {
    Ready(Arc<LoadedChunk>),
    Load,
    Wait { id: u64, rx: Receiver<LoadResult> },
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of all character records
pub struct ChunkStore {
    resources: Arc<dyn ResourceStore>,
    slots: Box<[Slot]>,
    parallel: bool,
    reads: AtomicU64,
    next_waiter: AtomicU64,
    all_loaded: AtomicBool,
}

impl ChunkStore {
    /// Create a store reading chunks from `resources`; nothing is loaded yet
    pub fn new(resources: Arc<dyn ResourceStore>) -> Self {
        let slots = (0..HUNDRED_COUNT).map(|_| Slot::new()).collect();
        Self {
            resources,
            slots,
            parallel: true,
            reads: AtomicU64::new(0),
            next_waiter: AtomicU64::new(0),
            all_loaded: AtomicBool::new(false),
        }
    }

    /// Load chunks on the rayon pool in [`ensure_all_loaded`](Self::ensure_all_loaded)
    pub fn with_parallel_loading(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of persisted-resource reads issued so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of chunks that have completed loading
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.loaded.get().is_some()).count()
    }

    /// Where chunks are read from
    pub fn describe(&self) -> String {
        self.resources.describe()
    }

    /// Current state of chunk `hundred`
    pub fn state(&self, hundred: u32) -> ChunkState {
        let Some(slot) = self.slots.get(hundred as usize) else {
            return ChunkState::Absent;
        };
        if let Some(chunk) = slot.loaded.get() {
            return chunk.state();
        }
        match &*lock(&slot.inflight) {
            Some(_) => ChunkState::Loading,
            None => slot
                .loaded
                .get()
                .map_or(ChunkState::Absent, |chunk| chunk.state()),
        }
    }

    /// Metadata for one code point, loading its chunk if needed
    pub fn get_character(&self, code: CodePoint) -> Result<CharRecord> {
        check_code(code)?;
        let chunk = self.acquire(hundred_of(code), None)?;
        Ok(chunk.record(code))
    }

    /// Like [`get_character`](Self::get_character), but gives up after
    /// `timeout` if the chunk is being loaded by another caller. Giving up
    /// removes only this caller from the queue.
    pub fn get_character_timeout(&self, code: CodePoint, timeout: Duration) -> Result<CharRecord> {
        check_code(code)?;
        let chunk = self.acquire(hundred_of(code), Some(timeout))?;
        Ok(chunk.record(code))
    }

    /// Load chunk `hundred` and return it, so callers can read neighbours
    pub fn ensure_chunk_loaded(&self, hundred: u32) -> Result<Arc<LoadedChunk>> {
        self.acquire(hundred, None)
    }

    /// Load every chunk in the code space
    pub fn ensure_all_loaded(&self) -> Result<()> {
        if self.all_loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        let start = Instant::now();
        let load = |hundred: u32| self.acquire(hundred, None).map(drop);
        if self.parallel {
            (0..HUNDRED_COUNT).into_par_iter().try_for_each(load)?;
        } else {
            (0..HUNDRED_COUNT).try_for_each(load)?;
        }

        self.all_loaded.store(true, Ordering::Release);
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            reads = self.read_count(),
            "all chunks loaded"
        );
        Ok(())
    }

    /// Records for `first..=last`, skipping surrogates
    pub fn get_range(&self, first: CodePoint, last: CodePoint) -> Result<Vec<CharRecord>> {
        if first > MAX_CODE {
            return Err(UcdError::OutOfRange(first));
        }
        if last > MAX_CODE {
            return Err(UcdError::OutOfRange(last));
        }

        let mut records = Vec::with_capacity(last.saturating_sub(first) as usize + 1);
        let mut current: Option<Arc<LoadedChunk>> = None;
        for code in (first..=last).filter(|&c| !is_surrogate(c)) {
            let hundred = hundred_of(code);
            let chunk = match &current {
                Some(chunk) if loaded_hundred(chunk) == hundred => Arc::clone(chunk),
                _ => {
                    let chunk = self.acquire(hundred, None)?;
                    current = Some(Arc::clone(&chunk));
                    chunk
                }
            };
            records.push(chunk.record(code));
        }
        Ok(records)
    }

    /// The 16 records of the table row containing `code`
    pub fn get_row(&self, code: CodePoint) -> Result<Vec<CharRecord>> {
        check_code(code)?;
        let first = code & !(ROW_SIZE - 1);
        self.get_range(first, first + ROW_SIZE - 1)
    }

    /// Every resident dense chunk, in code order
    pub fn dense_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.slots
            .iter()
            .filter_map(|slot| slot.loaded.get())
            .filter_map(|chunk| chunk.dense())
    }

    fn acquire(&self, hundred: u32, timeout: Option<Duration>) -> LoadResult {
        let Some(slot) = self.slots.get(hundred as usize) else {
            return Err(UcdError::OutOfRange(hundred.saturating_mul(CHUNK_SIZE)));
        };

        // Fast path: already loaded
        if let Some(chunk) = slot.loaded.get() {
            return Ok(Arc::clone(chunk));
        }

        let ticket = {
            let mut inflight = lock(&slot.inflight);
            if let Some(chunk) = slot.loaded.get() {
                Ticket::Ready(Arc::clone(chunk))
            } else if let Some(waiters) = inflight.as_mut() {
                let (tx, rx) = mpsc::sync_channel(1);
                let id = self.next_waiter.fetch_add(1, Ordering::Relaxed);
                waiters.push_back(Waiter { id, tx });
                Ticket::Wait { id, rx }
            } else {
                *inflight = Some(VecDeque::new());
                Ticket::Load
            }
        };

        match ticket {
            Ticket::Ready(chunk) => Ok(chunk),
            Ticket::Load => self.load(hundred, slot),
            Ticket::Wait { id, rx } => self.wait(hundred, slot, id, rx, timeout),
        }
    }

    /// Perform the single load for `hundred` and release its waiters
    fn load(&self, hundred: u32, slot: &Slot) -> LoadResult {
        let name = chunk_resource_name(hundred);
        let mut guard = LoadGuard {
            slot,
            hundred,
            done: false,
        };
        self.reads.fetch_add(1, Ordering::Relaxed);

        let result = match self.resources.read(&name) {
            Ok(Some(bytes)) => Chunk::from_json(hundred, &bytes).map(LoadedChunk::Dense),
            Ok(None) => Ok(LoadedChunk::Sparse(hundred)),
            Err(e) => Err(e),
        }
        .map(Arc::new);

        let waiters = {
            let mut inflight = lock(&slot.inflight);
            if let Ok(chunk) = &result {
                // Published before the queue is closed so late arrivals take the fast path
                let _ = slot.loaded.set(Arc::clone(chunk));
            }
            guard.done = true;
            inflight.take().unwrap_or_default()
        };

        match &result {
            Ok(chunk) if chunk.dense().is_some() => {
                debug!(chunk = %name, waiters = waiters.len(), "loaded dense chunk");
            }
            Ok(_) => {}
            Err(e) => warn!(chunk = %name, waiters = waiters.len(), error = %e, "chunk load failed"),
        }

        for waiter in waiters {
            let _ = waiter.tx.send(result.clone());
        }
        result
    }

    fn wait(
        &self,
        hundred: u32,
        slot: &Slot,
        id: u64,
        rx: Receiver<LoadResult>,
        timeout: Option<Duration>,
    ) -> LoadResult {
        let Some(timeout) = timeout else {
            return rx.recv().unwrap_or_else(|_| Err(abandoned(hundred)));
        };

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Disconnected) => Err(abandoned(hundred)),
            Err(RecvTimeoutError::Timeout) => {
                if let Some(waiters) = lock(&slot.inflight).as_mut() {
                    waiters.retain(|w| w.id != id);
                }
                // The load may have finished between the timeout and the removal
                rx.try_recv().unwrap_or(Err(UcdError::Timeout(hundred)))
            }
        }
    }
}

fn loaded_hundred(chunk: &LoadedChunk) -> u32 {
    match chunk {
        LoadedChunk::Sparse(hundred) => *hundred,
        LoadedChunk::Dense(chunk) => chunk.hundred(),
    }
}

/// Closes the queue of a load that unwinds before publishing a result,
/// so its waiters are released and the slot returns to absent
struct LoadGuard<'a> {
    slot: &'a Slot,
    hundred: u32,
    done: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let waiters = lock(&self.slot.inflight).take().unwrap_or_default();
        warn!(hundred = self.hundred, waiters = waiters.len(), "chunk loader abandoned its load");
        for waiter in waiters {
            let _ = waiter.tx.send(Err(abandoned(self.hundred)));
        }
    }
}

fn abandoned(hundred: u32) -> UcdError {
    UcdError::MalformedChunk {
        hundred,
        reason: "loader exited without a result".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::thread;

    /// In-memory resources with a read counter and an optional read delay
    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<HashMap<String, Vec<u8>>>,
        reads: Mutex<HashMap<String, usize>>,
        delay: Duration,
    }

    impl MemoryStore {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn put(&self, name: &str, bytes: impl Into<Vec<u8>>) {
            self.files.lock().unwrap().insert(name.to_string(), bytes.into());
        }

        fn reads_of(&self, name: &str) -> usize {
            self.reads.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    impl ResourceStore for MemoryStore {
        fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
            *self.reads.lock().unwrap().entry(name.to_string()).or_default() += 1;
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
            Ok(self.files.lock().unwrap().get(name).cloned())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn latin_chunk() -> Vec<u8> {
        let mut entries: Vec<Option<CharRecord>> = vec![None; 0x42];
        entries[0x41] = Some(CharRecord::assigned(0x41, "LATIN CAPITAL LETTER A", "Lu"));
        serde_json::to_vec(&entries).unwrap()
    }

    #[test]
    fn test_sparse_chunk_synthesizes() {
        let store = ChunkStore::new(Arc::new(MemoryStore::default()));

        let record = store.get_character(0xFDD0).unwrap();
        assert_eq!(record.code, 0xFDD0);
        assert_eq!(record.kind, CharKind::Noncharacter);
        assert_eq!(store.state(0xFD), ChunkState::LoadedSparse);
    }

    #[test]
    fn test_dense_chunk_and_gaps() {
        let resources = Arc::new(MemoryStore::default());
        resources.put("ucd.0000.json", latin_chunk());
        let store = ChunkStore::new(resources);

        assert_eq!(store.state(0), ChunkState::Absent);
        let a = store.get_character(0x41).unwrap();
        assert_eq!(a.name.as_deref(), Some("LATIN CAPITAL LETTER A"));
        assert_eq!(store.state(0), ChunkState::LoadedDense);

        // gap inside a dense chunk falls back to the range rules
        let gap = store.get_character(0x20).unwrap();
        assert_eq!(gap.kind, CharKind::Reserved);
        assert_eq!(gap.code, 0x20);
    }

    #[test]
    fn test_repeated_lookups_identical() {
        let resources = Arc::new(MemoryStore::default());
        resources.put("ucd.0000.json", latin_chunk());
        let store = ChunkStore::new(resources.clone());

        let first = store.get_character(0x41).unwrap();
        let second = store.get_character(0x41).unwrap();
        assert_eq!(first, second);
        assert_eq!(resources.reads_of("ucd.0000.json"), 1);
    }

    #[test]
    fn test_concurrent_requests_coalesce() {
        let resources = Arc::new(MemoryStore::with_delay(Duration::from_millis(50)));
        resources.put("ucd.4100.json", "[]");
        let store = Arc::new(ChunkStore::new(resources.clone()));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.get_character(0x4100 + i).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap().code, 0x4100 + i as u32);
        }
        assert_eq!(resources.reads_of("ucd.4100.json"), 1);
        assert_eq!(store.read_count(), 1);
    }

    #[test]
    fn test_malformed_chunk_fails_and_retries() {
        let resources = Arc::new(MemoryStore::default());
        resources.put("ucd.0000.json", "[{\"code\": 5, \"type\": \"reserved\", \"gc\": \"Cn\"}]");
        let store = ChunkStore::new(resources.clone());

        let err = store.get_character(0x41).unwrap_err();
        assert!(matches!(err, UcdError::MalformedChunk { hundred: 0, .. }));
        assert_eq!(store.state(0), ChunkState::Absent);

        resources.put("ucd.0000.json", latin_chunk());
        assert_eq!(store.get_character(0x41).unwrap().general_category, "Lu");
    }

    #[test]
    fn test_timeout_leaves_queue_intact() {
        let resources = Arc::new(MemoryStore::with_delay(Duration::from_millis(300)));
        resources.put("ucd.0000.json", latin_chunk());
        let store = Arc::new(ChunkStore::new(resources.clone()));

        let loader = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.get_character(0x41))
        };
        thread::sleep(Duration::from_millis(50));
        let patient = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.get_character(0x42))
        };
        thread::sleep(Duration::from_millis(20));

        let impatient = store.get_character_timeout(0x43, Duration::from_millis(10));
        assert!(matches!(impatient, Err(UcdError::Timeout(0))));

        assert_eq!(loader.join().unwrap().unwrap().code, 0x41);
        assert_eq!(patient.join().unwrap().unwrap().code, 0x42);
        assert_eq!(resources.reads_of("ucd.0000.json"), 1);
    }

    #[test]
    fn test_contract_violations() {
        let store = ChunkStore::new(Arc::new(MemoryStore::default()));
        assert!(matches!(store.get_character(0xD800), Err(UcdError::Surrogate(_))));
        assert!(matches!(store.get_character(0x110000), Err(UcdError::OutOfRange(_))));
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn test_row_and_range() {
        let resources = Arc::new(MemoryStore::default());
        resources.put("ucd.0000.json", latin_chunk());
        let store = ChunkStore::new(resources);

        let row = store.get_row(0x4A).unwrap();
        let codes: Vec<u32> = row.iter().map(|r| r.code).collect();
        assert_eq!(codes, (0x40..0x50).collect::<Vec<_>>());
        assert_eq!(row[1].kind, CharKind::Assigned);

        // ranges spanning the surrogate block skip it
        let range = store.get_range(0xD7FF, 0xE000).unwrap();
        let codes: Vec<u32> = range.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![0xD7FF, 0xE000]);

        assert!(store.get_row(0xD805).is_err());
    }

    #[test]
    fn test_chunk_round_trip() {
        let bytes = latin_chunk();
        let chunk = Chunk::from_json(0, &bytes).unwrap();
        let encoded = chunk.to_json().unwrap();

        let original: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let reencoded: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(original, reencoded);
        assert_eq!(Chunk::from_json(0, &encoded).unwrap(), chunk);
    }

    #[test]
    fn test_chunk_validation() {
        let too_long: Vec<Option<CharRecord>> = vec![None; 257];
        assert!(Chunk::from_entries(0, too_long).is_err());

        let mut unnamed = CharRecord::assigned(0x41, "A", "Lu");
        unnamed.general_category.clear();
        let mut entries = vec![None; 0x42];
        entries[0x41] = Some(unnamed);
        assert!(Chunk::from_entries(0, entries).is_err());
    }

    #[test]
    fn test_ensure_all_loaded() {
        let resources = Arc::new(MemoryStore::default());
        resources.put("ucd.0000.json", latin_chunk());
        let store = ChunkStore::new(resources).with_parallel_loading(false);

        store.ensure_all_loaded().unwrap();
        assert_eq!(store.read_count(), HUNDRED_COUNT as u64);
        assert_eq!(store.dense_chunks().count(), 1);

        // second call is free
        store.ensure_all_loaded().unwrap();
        assert_eq!(store.read_count(), HUNDRED_COUNT as u64);
    }

    /// Panics on the first read of each resource, then serves `inner`
    struct PanicOnceStore {
        inner: MemoryStore,
        panicked: Mutex<bool>,
    }

    impl ResourceStore for PanicOnceStore {
        fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
            let first = !std::mem::replace(&mut *self.panicked.lock().unwrap(), true);
            let result = self.inner.read(name);
            if first {
                panic!("read of {} failed", name);
            }
            result
        }

        fn describe(&self) -> String {
            "panic-once".to_string()
        }
    }

    #[test]
    fn test_panicking_loader_releases_waiters() {
        let inner = MemoryStore::with_delay(Duration::from_millis(200));
        inner.put("ucd.0000.json", latin_chunk());
        let resources = Arc::new(PanicOnceStore {
            inner,
            panicked: Mutex::new(false),
        });
        let store = Arc::new(ChunkStore::new(resources.clone()));

        let loader = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.get_character(0x41))
        };
        thread::sleep(Duration::from_millis(50));
        assert_eq!(store.state(0), ChunkState::Loading);

        let waiter = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.get_character(0x41))
        };

        assert!(loader.join().is_err());
        let err = waiter.join().unwrap().unwrap_err();
        assert!(matches!(err, UcdError::MalformedChunk { hundred: 0, .. }));
        assert_eq!(store.state(0), ChunkState::Absent);

        // the next request loads again
        assert!(store.get_character(0x41).unwrap().is_assigned());
        assert_eq!(resources.inner.reads_of("ucd.0000.json"), 2);
    }
}
