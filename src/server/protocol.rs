//! Protocol messages for client-server communication
//!
//! Uses a simple length-prefixed JSON protocol:
//! - 4 bytes (little-endian u32): message length
//! - N bytes: JSON-encoded message

use crate::data::types::{Block, CharRecord, CharSet, CodePoint, Sequence};
use crate::query::SearchResult;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Largest message accepted from the wire
const MAX_MESSAGE_BYTES: usize = 100 * 1024 * 1024;

/// Request from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    /// Bootstrap data: blocks, emoji list, sequences, palettes
    Init,

    /// Full record for one code point
    GetChar { code: CodePoint },

    /// Name and emoji flag for one code point
    GetCharName { code: CodePoint },

    /// The 16 records of the row containing `code`
    GetRow { code: CodePoint },

    /// Load everything search needs without searching
    InitSearch,

    /// Free-text search
    Search { query: String },

    /// Variant family of a sequence
    GetVariants { codes: Vec<CodePoint> },

    /// Check server health and get stats
    Status,

    /// Graceful shutdown request
    Shutdown,

    /// Ping for connection testing
    Ping,
}

/// Response from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    Init(InitResponse),

    Char(CharInfo),

    CharName(CharName),

    Row { chars: Vec<CharRecord> },

    /// Search data is resident
    SearchReady { duration_ms: f64 },

    Search(SearchResponse),

    /// `None` when the sequence has no variants
    Variants { variants: Option<Vec<Sequence>> },

    Status(StatusResponse),

    /// Shutdown acknowledged
    ShuttingDown,

    /// Pong response
    Pong,

    /// Error response
    Error { message: String },
}

/// Everything a client needs before browsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitResponse {
    pub blocks: Vec<Block>,
    /// Code points with default emoji presentation
    pub emoji: Vec<CodePoint>,
    pub sequences: Vec<Sequence>,
    pub palettes: Vec<CharSet>,
}

/// A record annotated with display labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharInfo {
    pub char: CharRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_label: Option<String>,
    /// Name of the containing block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharName {
    pub code: CodePoint,
    pub name: Option<String>,
    pub is_emoji: bool,
}

/// Search results response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Time taken in milliseconds
    pub duration_ms: f64,
    /// Whether results came from cache
    pub cached: bool,
}

/// Server status response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Total requests served
    pub requests_served: u64,
    /// Total searches served
    pub searches_served: u64,
    /// Search cache hit rate (0.0 - 1.0)
    pub cache_hit_rate: f32,
    /// Chunks resident in memory
    pub chunks_loaded: usize,
    /// Persisted chunk reads issued
    pub chunk_reads: u64,
    /// Where resources are read from
    pub resources: String,
}

/// Write a message to a stream with length prefix
pub fn write_message<W: Write>(writer: &mut W, msg: &impl Serialize) -> std::io::Result<()> {
    let json = serde_json::to_vec(msg)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let len = u32::try_from(json.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "Message too large")
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(())
}

/// Read a message from a stream with length prefix
pub fn read_message<R: Read, T: for<'de> Deserialize<'de>>(reader: &mut R) -> std::io::Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_le_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Message too large",
        ));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;

    serde_json::from_slice(&buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchedProperties, SearchHit};
    use std::io::Cursor;

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(Request::GetCharName { code: 0x41 }).unwrap();
        assert_eq!(json["type"], "get-char-name");
        assert_eq!(json["code"], 0x41);

        let decoded: Request = serde_json::from_str(r#"{"type":"init-search"}"#).unwrap();
        assert_eq!(decoded, Request::InitSearch);
    }

    #[test]
    fn test_roundtrip_request() {
        let req = Request::GetVariants {
            codes: vec![0x1F44D, 0x1F3FB],
        };

        let mut buf = Vec::new();
        write_message(&mut buf, &req).unwrap();
        assert_eq!(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize, buf.len() - 4);

        let mut cursor = Cursor::new(buf);
        let decoded: Request = read_message(&mut cursor).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_roundtrip_response() {
        let resp = Response::Search(SearchResponse {
            results: vec![SearchResult {
                codes: vec![0x41],
                hit: SearchHit::Char {
                    char: CharRecord::assigned(0x41, "LATIN CAPITAL LETTER A", "Lu"),
                },
                matched: MatchedProperties::default(),
                relevance: 9.0,
            }],
            duration_ms: 12.5,
            cached: false,
        });

        let mut buf = Vec::new();
        write_message(&mut buf, &resp).unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded: Response = read_message(&mut cursor).unwrap();

        match decoded {
            Response::Search(sr) => {
                assert_eq!(sr.results.len(), 1);
                assert_eq!(sr.results[0].codes, vec![0x41]);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_oversized_message_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(200u32 * 1024 * 1024).to_le_bytes());
        let err = read_message::<_, Request>(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
