//! Centralized constants for the splunkblaze workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default Splunk management port.
pub const DEFAULT_SPLUNK_PORT: u16 = 8089;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Default maximum number of retries for rate-limited or unavailable responses.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Upper bound accepted for `max_retries`.
pub const MAX_MAX_RETRIES: usize = 10;

/// Base delay for exponential retry backoff in milliseconds.
///
/// Kept well below the poll budget so a retried status call cannot eat the
/// whole wait window of a streaming request.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

// =============================================================================
// Listener Defaults
// =============================================================================

/// Default web server port.
pub const DEFAULT_LISTEN_PORT: u16 = 8888;

/// Default bind address for the web server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

// =============================================================================
// Polling & Streaming Defaults
// =============================================================================

/// Default wait budget for one streamed search, in seconds. Negative disables it.
pub const DEFAULT_MAX_WAIT_SECS: i64 = 10;

/// Default interval between job status polls in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default number of events written per flush.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Upper bound accepted for the flush batch size.
pub const MAX_BATCH_SIZE: usize = 10_000;

// =============================================================================
// Result Formatting Defaults (passed through to the search job)
// =============================================================================

/// Segmentation mode requested for fetched events.
pub const DEFAULT_SEGMENTATION: &str = "full";

/// Maximum lines rendered per event by the remote platform.
pub const DEFAULT_MAX_LINES: usize = 500;

// =============================================================================
// Development Credentials
// =============================================================================

/// Username used when no credential is configured.
pub const DEFAULT_USERNAME: &str = "admin";

/// Password used when no credential is configured.
pub const DEFAULT_PASSWORD: &str = "changeme";
