//! Configuration management for splunkblaze.
//!
//! This crate provides the types and the loader used to assemble the
//! remote connection, credential, listener, and streaming settings from
//! builder overrides, environment variables, and an optional `.env` file.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use types::{
    AuthConfig, AuthStrategy, Config, ConnectionConfig, FetchConfig, ServerConfig, StreamConfig,
};
