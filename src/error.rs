//! Error types for the character store and search engine

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the data layer.
///
/// Errors are `Clone` so a single failed chunk load can be handed to every
/// waiter queued on that chunk.
#[derive(Debug, Clone, Error)]
pub enum UcdError {
    #[error("code point {0:#X} is outside 0..=0x10FFFF")]
    OutOfRange(u32),

    #[error("code point {0:#06X} is a surrogate")]
    Surrogate(u32),

    #[error("required resource {0} is missing")]
    MissingResource(String),

    #[error("resource {name} is malformed: {reason}")]
    MalformedResource { name: String, reason: String },

    #[error("chunk {hundred:#06X} is malformed: {reason}")]
    MalformedChunk { hundred: u32, reason: String },

    #[error("timed out waiting for chunk {0:#06X}")]
    Timeout(u32),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("I/O error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: Arc<io::Error>,
    },
}

impl UcdError {
    pub(crate) fn io(name: impl Into<String>, source: io::Error) -> Self {
        UcdError::Io {
            name: name.into(),
            source: Arc::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, UcdError>;
