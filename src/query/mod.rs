pub mod engine;
pub mod parser;
pub mod scorer;

pub use engine::{MAX_RESULTS, SearchEngine, SearchHit, SearchResult};
pub use parser::{ParsedQuery, parse_query};
pub use scorer::{MatchKind, MatchedProperties};
