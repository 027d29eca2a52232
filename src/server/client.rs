//! Client for connecting to the character server daemon

use crate::data::types::{CharRecord, CodePoint, Sequence};
use crate::server::get_socket_path;
use crate::server::protocol::{
    CharInfo, CharName, InitResponse, Request, Response, SearchResponse, StatusResponse,
    read_message, write_message,
};
use std::io::{BufReader, BufWriter};
use std::os::unix::net::UnixStream;
use std::time::Duration;
use thiserror::Error;

/// Read/write timeout
const IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Character server is not running")]
    NotRunning,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected response from server")]
    InvalidResponse,
}

/// Client for the character server
pub struct UnicodeClient {
    reader: BufReader<UnixStream>,
    writer: BufWriter<UnixStream>,
}

impl UnicodeClient {
    /// Try to connect to the running daemon
    /// Returns None if daemon is not running (allowing fallback to direct mode)
    pub fn connect() -> Option<Self> {
        let socket_path = get_socket_path();

        if !socket_path.exists() {
            return None;
        }

        let stream = UnixStream::connect(&socket_path).ok()?;
        Self::from_stream(stream).ok()
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: UnixStream) -> std::io::Result<Self> {
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;

        let reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream);

        Ok(Self { reader, writer })
    }

    /// Connect or return an error (for when daemon is required)
    pub fn connect_required() -> ClientResult<Self> {
        Self::connect().ok_or(ClientError::NotRunning)
    }

    /// Send one request and read its response; server errors become `Err`
    pub fn request(&mut self, request: &Request) -> ClientResult<Response> {
        write_message(&mut self.writer, request)?;
        match read_message(&mut self.reader)? {
            Response::Error { message } => Err(ClientError::Server(message)),
            response => Ok(response),
        }
    }

    pub fn init(&mut self) -> ClientResult<InitResponse> {
        match self.request(&Request::Init)? {
            Response::Init(init) => Ok(init),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn char_info(&mut self, code: CodePoint) -> ClientResult<CharInfo> {
        match self.request(&Request::GetChar { code })? {
            Response::Char(info) => Ok(info),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn char_name(&mut self, code: CodePoint) -> ClientResult<CharName> {
        match self.request(&Request::GetCharName { code })? {
            Response::CharName(name) => Ok(name),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn row(&mut self, code: CodePoint) -> ClientResult<Vec<CharRecord>> {
        match self.request(&Request::GetRow { code })? {
            Response::Row { chars } => Ok(chars),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Ask the server to load everything search needs
    pub fn init_search(&mut self) -> ClientResult<f64> {
        match self.request(&Request::InitSearch)? {
            Response::SearchReady { duration_ms } => Ok(duration_ms),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn search(&mut self, query: &str) -> ClientResult<SearchResponse> {
        let request = Request::Search {
            query: query.to_string(),
        };
        match self.request(&request)? {
            Response::Search(results) => Ok(results),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    pub fn variants(&mut self, codes: &[CodePoint]) -> ClientResult<Option<Vec<Sequence>>> {
        let request = Request::GetVariants {
            codes: codes.to_vec(),
        };
        match self.request(&request)? {
            Response::Variants { variants } => Ok(variants),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Get server status
    pub fn status(&mut self) -> ClientResult<StatusResponse> {
        match self.request(&Request::Status)? {
            Response::Status(status) => Ok(status),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Request graceful shutdown
    pub fn shutdown(&mut self) -> ClientResult<()> {
        match self.request(&Request::Shutdown)? {
            Response::ShuttingDown => Ok(()),
            _ => Err(ClientError::InvalidResponse),
        }
    }

    /// Ping the server
    pub fn ping(&mut self) -> ClientResult<()> {
        match self.request(&Request::Ping)? {
            Response::Pong => Ok(()),
            _ => Err(ClientError::InvalidResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::{BLOCKS_RESOURCE, SEQUENCES_RESOURCE};
    use crate::server::daemon::UnicodeServer;
    use crate::server::service::UnicodeService;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_client_over_socket_pair() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(BLOCKS_RESOURCE),
            r#"[{"firstCode":0,"lastCode":127,"name":"Basic Latin"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(SEQUENCES_RESOURCE),
            r#"[{"codes":[49,65039,8419],"name":"keycap: 1"},
                {"codes":[49,8419],"name":"keycap: 1 (text)"}]"#,
        )
        .unwrap();
        let service = UnicodeService::open_dir(dir.path(), false).unwrap();
        let server = UnicodeServer::new(service, 8);

        let (client_end, server_end) = UnixStream::pair().unwrap();
        let handle = thread::spawn(move || server.handle_connection(server_end));

        let mut client = UnicodeClient::from_stream(client_end).unwrap();
        client.ping().unwrap();

        let init = client.init().unwrap();
        assert_eq!(init.blocks[0].name, "Basic Latin");
        assert_eq!(init.sequences.len(), 2);

        let info = client.char_info(0x41).unwrap();
        assert_eq!(info.block.as_deref(), Some("Basic Latin"));
        assert_eq!(info.char.general_category, "Cn");

        let variants = client.variants(&[0x31, 0xFE0F, 0x20E3]).unwrap().unwrap();
        assert_eq!(variants[0].name, "keycap: 1 (text)");

        let err = client.row(0xDC00).unwrap_err();
        assert!(matches!(err, ClientError::Server(_)));

        drop(client);
        handle.join().unwrap().unwrap();
    }
}
