//! Configuration type definitions for splunkblaze.
//!
//! Responsibilities:
//! - Define configuration types for the remote connection, credentials,
//!   the web listener, and the streaming poll loop.
//! - Ensure consistent defaults across the workspace.
//!
//! Does NOT handle:
//! - Loading from environment variables or `.env` files (see `loader` module).
//! - Network connections or authentication flows (see the client crate).
//!
//! Invariants:
//! - All secret types use `secrecy::SecretString` to prevent accidental logging.
//! - Defaults come from [`crate::constants`], never from inline numbers.

mod auth;
mod connection;
mod stream;

pub use auth::{AuthConfig, AuthStrategy};
pub use connection::{Config, ConnectionConfig};
pub use stream::{FetchConfig, ServerConfig, StreamConfig};
