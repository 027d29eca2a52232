//! Unix character server daemon
//!
//! Keeps the character store warm in memory and serves requests over a Unix
//! socket, one thread per connection.

use crate::query::SearchResult;
use crate::server::protocol::{
    Request, Response, SearchResponse, StatusResponse, read_message, write_message,
};
use crate::server::service::UnicodeService;
use crate::server::{get_log_path, get_pid_path, get_socket_path};
use anyhow::{Context, Result};
use lru::LruCache;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::num::NonZeroUsize;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Connection timeout
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// How the server finds and serves its data
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub resources_dir: PathBuf,
    pub parallel_loading: bool,
    /// Entries in the search result cache
    pub cache_size: usize,
}

/// Statistics for the server
struct ServerStats {
    start_time: Instant,
    requests_served: AtomicU64,
    searches_served: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl ServerStats {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            requests_served: AtomicU64::new(0),
            searches_served: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    fn cache_hit_rate(&self) -> f32 {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f32 / total as f32
        }
    }
}

/// The character server
pub struct UnicodeServer {
    service: UnicodeService,
    /// Search results by query text
    search_cache: Mutex<LruCache<String, Vec<SearchResult>>>,
    stats: ServerStats,
    shutdown: AtomicBool,
}

impl UnicodeServer {
    /// Create a server over an opened service
    pub fn new(service: UnicodeService, cache_size: usize) -> Arc<Self> {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Arc::new(Self {
            service,
            search_cache: Mutex::new(LruCache::new(capacity)),
            stats: ServerStats::new(),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Open resources and create a server
    pub fn open(options: &ServerOptions) -> Result<Arc<Self>> {
        let service = UnicodeService::open_dir(&options.resources_dir, options.parallel_loading)
            .with_context(|| {
                format!("Failed to open resources in {}", options.resources_dir.display())
            })?;
        Ok(Self::new(service, options.cache_size))
    }

    /// Start the server (blocking)
    pub fn run(self: &Arc<Self>) -> Result<()> {
        let socket_path = get_socket_path();
        let pid_path = get_pid_path();

        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Remove stale socket file
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }

        fs::write(&pid_path, format!("{}", std::process::id()))?;

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind to {}", socket_path.display()))?;

        // Socket is private to the user
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&socket_path, fs::Permissions::from_mode(0o600))?;
        }

        info!(socket = %socket_path.display(), "listening");

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            match stream {
                Ok(stream) => {
                    let _ = stream.set_read_timeout(Some(CONNECTION_TIMEOUT));
                    let _ = stream.set_write_timeout(Some(CONNECTION_TIMEOUT));

                    let server = Arc::clone(self);
                    thread::spawn(move || {
                        if let Err(e) = server.handle_connection(stream) {
                            warn!(error = %e, "connection error");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "accept error");
                }
            }
        }

        let _ = fs::remove_file(&socket_path);
        let _ = fs::remove_file(&pid_path);
        info!("shut down");

        Ok(())
    }

    /// Handle a single client connection
    pub(crate) fn handle_connection(&self, stream: UnixStream) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = BufWriter::new(stream);

        loop {
            let request: Request = match read_message(&mut reader) {
                Ok(req) => req,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected
                    break;
                }
                Err(e) => {
                    let resp = Response::Error {
                        message: format!("Invalid request: {}", e),
                    };
                    write_message(&mut writer, &resp)?;
                    continue;
                }
            };

            let response = self.handle_request(request);
            write_message(&mut writer, &response)?;

            if matches!(response, Response::ShuttingDown) {
                // Wake the accept loop so it sees the flag
                let _ = UnixStream::connect(get_socket_path());
                break;
            }
        }

        Ok(())
    }

    /// Handle a single request
    pub fn handle_request(&self, request: Request) -> Response {
        self.stats.requests_served.fetch_add(1, Ordering::Relaxed);
        match request {
            Request::Search { query } => self.handle_search(query),
            Request::Status => self.handle_status(),
            Request::Shutdown => {
                self.shutdown.store(true, Ordering::Relaxed);
                Response::ShuttingDown
            }
            other => self.service.handle(other),
        }
    }

    fn handle_search(&self, query: String) -> Response {
        let start = Instant::now();
        self.stats.searches_served.fetch_add(1, Ordering::Relaxed);

        let cached = self
            .search_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&query)
            .cloned();
        if let Some(results) = cached {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Response::Search(SearchResponse {
                results,
                duration_ms: start.elapsed().as_secs_f64() * 1000.0,
                cached: true,
            });
        }

        self.stats.cache_misses.fetch_add(1, Ordering::Relaxed);

        let results = match self.service.search(&query) {
            Ok(results) => results,
            Err(e) => {
                return Response::Error {
                    message: format!("Search failed: {}", e),
                };
            }
        };

        self.search_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(query, results.clone());

        debug!(results = results.len(), "search served");
        Response::Search(SearchResponse {
            results,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
            cached: false,
        })
    }

    fn handle_status(&self) -> Response {
        let base = self.service.status();
        Response::Status(StatusResponse {
            uptime_secs: self.stats.start_time.elapsed().as_secs(),
            requests_served: self.stats.requests_served.load(Ordering::Relaxed),
            searches_served: self.stats.searches_served.load(Ordering::Relaxed),
            cache_hit_rate: self.stats.cache_hit_rate(),
            ..base
        })
    }
}

/// Daemonize the current process
pub fn daemonize(options: ServerOptions) -> Result<()> {
    // Double fork so the daemon is never a session leader
    match unsafe { libc::fork() } {
        -1 => anyhow::bail!("First fork failed"),
        0 => {
            if unsafe { libc::setsid() } == -1 {
                anyhow::bail!("setsid failed");
            }

            match unsafe { libc::fork() } {
                -1 => anyhow::bail!("Second fork failed"),
                0 => {
                    unsafe {
                        libc::close(0);
                        libc::close(1);
                        libc::close(2);

                        let null = libc::open(c"/dev/null".as_ptr(), libc::O_RDWR);
                        if null != -1 {
                            libc::dup2(null, 0);
                            libc::dup2(null, 1);
                            libc::dup2(null, 2);
                            if null > 2 {
                                libc::close(null);
                            }
                        }
                    }

                    let _ = std::env::set_current_dir("/");

                    let result = UnicodeServer::open(&options).and_then(|server| server.run());
                    if let Err(e) = result {
                        // stderr is gone; leave the reason next to the socket
                        let _ = fs::write(get_log_path(), format!("{:#}\n", e));
                    }
                    std::process::exit(0);
                }
                _ => std::process::exit(0),
            }
        }
        _ => {
            // Parent: reap the first child
            unsafe {
                let mut status: libc::c_int = 0;
                libc::wait(&mut status);
            }
            Ok(())
        }
    }
}

/// Start the server in the foreground
pub fn run_foreground(options: ServerOptions) -> Result<()> {
    let server = UnicodeServer::open(&options)?;
    server.run()
}

/// Stop the running daemon
pub fn stop_daemon() -> Result<bool> {
    let pid_path = get_pid_path();

    if !pid_path.exists() {
        return Ok(false);
    }

    let pid_str = fs::read_to_string(&pid_path)?;
    let pid: i32 = pid_str.trim().parse()?;

    unsafe {
        if libc::kill(pid, libc::SIGTERM) == 0 {
            thread::sleep(Duration::from_millis(500));

            if libc::kill(pid, 0) == 0 {
                thread::sleep(Duration::from_secs(1));
                if libc::kill(pid, 0) == 0 {
                    error!(pid, "daemon ignored SIGTERM, killing");
                    libc::kill(pid, libc::SIGKILL);
                }
            }
        }
    }

    let _ = fs::remove_file(get_socket_path());
    let _ = fs::remove_file(&pid_path);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::storage::{BLOCKS_RESOURCE, DirStore};
    use tempfile::tempdir;

    fn server() -> (tempfile::TempDir, Arc<UnicodeServer>) {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(BLOCKS_RESOURCE),
            r#"[{"firstCode":0,"lastCode":127,"name":"Basic Latin"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("ucd.0000.json"),
            r#"[null,null,null,null,null,null,null,null,null,null,
                {"code":10,"type":"char","gc":"Cc","name":"<control> LINE FEED"}]"#,
        )
        .unwrap();
        let service = UnicodeService::open(Arc::new(DirStore::new(dir.path())), false).unwrap();
        (dir, UnicodeServer::new(service, 4))
    }

    #[test]
    fn test_search_cache() {
        let (_dir, server) = server();

        let first = server.handle_request(Request::Search {
            query: "line feed".to_string(),
        });
        let second = server.handle_request(Request::Search {
            query: "line feed".to_string(),
        });

        match (first, second) {
            (Response::Search(a), Response::Search(b)) => {
                assert!(!a.cached);
                assert!(b.cached);
                assert_eq!(a.results, b.results);
                assert_eq!(a.results[0].codes, vec![0x0A]);
            }
            other => panic!("unexpected responses {:?}", other),
        }

        match server.handle_request(Request::Status) {
            Response::Status(status) => {
                assert_eq!(status.requests_served, 3);
                assert_eq!(status.searches_served, 2);
                assert_eq!(status.cache_hit_rate, 0.5);
                assert_eq!(status.chunks_loaded, 0x1100);
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_errors_do_not_poison_server() {
        let (_dir, server) = server();

        assert!(matches!(
            server.handle_request(Request::GetChar { code: 0xD800 }),
            Response::Error { .. }
        ));
        assert!(matches!(
            server.handle_request(Request::GetChar { code: 0x0A }),
            Response::Char(_)
        ));
        assert_eq!(server.handle_request(Request::Ping), Response::Pong);
        assert_eq!(
            server.handle_request(Request::Shutdown),
            Response::ShuttingDown
        );
        assert!(server.shutdown.load(Ordering::Relaxed));
    }
}
