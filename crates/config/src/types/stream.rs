//! Listener, poll loop, and result formatting settings.
//!
//! Invariants:
//! - A negative `max_wait_secs` disables the wait budget entirely.
//! - `batch_size` and `poll_interval` are validated non-zero by the loader.

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_BIND_ADDR, DEFAULT_LISTEN_PORT, DEFAULT_MAX_LINES,
    DEFAULT_MAX_WAIT_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SEGMENTATION,
};
use secrecy::SecretString;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Web listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: IpAddr,
    /// Port the HTTP listener binds to
    pub port: u16,
    /// Optional Prometheus exporter address
    pub metrics_bind: Option<SocketAddr>,
    /// Key for signing form tokens; a random key is used when unset
    pub cookie_secret: Option<SecretString>,
}

impl ServerConfig {
    /// Full socket address of the listener.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: DEFAULT_LISTEN_PORT,
            metrics_bind: None,
            cookie_secret: None,
        }
    }
}

/// Settings for the per-request poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Total wait budget in seconds; negative disables the cap
    pub max_wait_secs: i64,
    /// Interval between status polls while the job is idle
    pub poll_interval: Duration,
    /// Maximum number of events written per flush
    pub batch_size: usize,
}

impl StreamConfig {
    /// The wait budget, or `None` when disabled by a negative value.
    pub fn max_wait(&self) -> Option<Duration> {
        u64::try_from(self.max_wait_secs)
            .ok()
            .map(Duration::from_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: DEFAULT_MAX_WAIT_SECS,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Result formatting options pinned on a job at dispatch time.
///
/// These are passed through to the remote platform untouched; nothing in
/// this workspace enforces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Segmentation mode for event text
    pub segmentation: String,
    /// Maximum lines the remote renders per event
    pub max_lines: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            segmentation: DEFAULT_SEGMENTATION.to_string(),
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}
