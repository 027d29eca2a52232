//! Persistent character server
//!
//! This module provides a daemon that keeps the character store loaded in
//! memory, so lookups and searches skip the cold start.
//!
//! Architecture:
//! - `service`: answers protocol requests against the store
//! - `daemon`: listens on a Unix socket, caches searches, tracks stats
//! - `client`: connects to the socket, sends requests, reads responses
//! - Fallback: if the daemon is unavailable, the CLI opens the store directly

#[cfg(all(unix, feature = "daemon"))]
pub mod client;
#[cfg(all(unix, feature = "daemon"))]
pub mod daemon;
pub mod protocol;
pub mod service;

#[cfg(all(unix, feature = "daemon"))]
pub use client::{ClientError, UnicodeClient};
pub use service::UnicodeService;

use std::path::PathBuf;

/// Per-user runtime file `unidex.<ext>`
#[cfg(unix)]
fn runtime_path(ext: &str) -> PathBuf {
    // XDG_RUNTIME_DIR first (tmpfs-backed, user-private)
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(format!("unidex.{}", ext));
    }

    if let Some(home) = dirs::home_dir() {
        return home
            .join(".local")
            .join("run")
            .join(format!("unidex.{}", ext));
    }

    // Last resort: /tmp with user ID
    let uid = unsafe { libc::getuid() };
    PathBuf::from(format!("/tmp/unidex-{}.{}", uid, ext))
}

/// Get the socket path for the character server
#[cfg(unix)]
pub fn get_socket_path() -> PathBuf {
    runtime_path("sock")
}

/// Get the PID file path for the daemon
#[cfg(unix)]
pub fn get_pid_path() -> PathBuf {
    runtime_path("pid")
}

/// Where a detached daemon leaves its startup error
#[cfg(unix)]
pub fn get_log_path() -> PathBuf {
    runtime_path("log")
}

/// Check if the daemon is running
#[cfg(unix)]
pub fn is_daemon_running() -> bool {
    let Ok(pid_str) = std::fs::read_to_string(get_pid_path()) else {
        return false;
    };
    let Ok(pid) = pid_str.trim().parse::<i32>() else {
        return false;
    };
    // Signal 0 only checks that the process exists
    unsafe { libc::kill(pid, 0) == 0 }
}
