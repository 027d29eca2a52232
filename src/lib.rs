//! # unidex - Unicode character database engine
//!
//! unidex serves the Unicode character database from a directory of
//! pre-generated JSON resources. Character data is split into 0x1100
//! chunks of 256 code points that load lazily, one read per chunk no
//! matter how many threads ask for it at once.
//!
//! ## Architecture
//!
//! - [`data`] - Resource layout, the chunk store, blocks and sequences
//! - [`query`] - Query parsing, property matching and ranking
//! - [`server`] - Request service, persistent daemon and its client
//! - [`ingest`] - Offline conversion of raw UCD files into resources
//! - [`output`] - Terminal formatting
//! - [`utils`] - Configuration, logging and progress bars
//!
//! ## Quick Start
//!
//! ```ignore
//! use unidex::server::UnicodeService;
//! use std::path::Path;
//!
//! let service = UnicodeService::open_dir(Path::new("resources"), true)?;
//! let info = service.char_info(0x1F600)?;
//! println!("{}", info.char.name.unwrap_or_default());
//!
//! for result in service.search("grinning face")? {
//!     println!("{:?} {}", result.codes, result.relevance);
//! }
//! ```

pub mod data;
pub mod error;
pub mod ingest;
pub mod output;
pub mod query;
pub mod server;
pub mod utils;

pub use data::{ChunkStore, DirStore, ResourceStore};
pub use error::{Result, UcdError};
pub use query::{SearchEngine, SearchResult};
pub use server::UnicodeService;
