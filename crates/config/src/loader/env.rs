//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse environment variables for the connection, listener and poll loop.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid values return `ConfigError::InvalidValue` naming the variable.
//! - Values already set on the loader (command-line flags) are never overwritten.

use secrecy::SecretString;
use std::str::FromStr;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parse an environment variable into `T`, naming the variable on failure.
fn parse_env<T: FromStr>(key: &str, message: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
                var: key.to_string(),
                message: message.to_string(),
            })
        })
        .transpose()
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    // Connection
    if loader.base_url.is_none() {
        loader.base_url = env_var_or_none("SPLUNK_BASE_URL");
    }
    if loader.username.is_none() {
        loader.username = env_var_or_none("SPLUNK_USERNAME");
    }
    if loader.password.is_none() {
        loader.password =
            env_var_or_none("SPLUNK_PASSWORD").map(|p| SecretString::new(p.into()));
    }
    if loader.api_token.is_none() {
        loader.api_token =
            env_var_or_none("SPLUNK_API_TOKEN").map(|t| SecretString::new(t.into()));
    }
    if loader.skip_verify.is_none() {
        loader.skip_verify = parse_env("SPLUNK_SKIP_VERIFY", "must be true or false")?;
    }
    if loader.timeout.is_none() {
        loader.timeout = parse_env::<u64>("SPLUNK_TIMEOUT", "must be a number")?
            .map(Duration::from_secs);
    }
    if loader.max_retries.is_none() {
        loader.max_retries =
            parse_env("SPLUNK_MAX_RETRIES", "must be a non-negative integer")?;
    }

    // Listener
    if loader.bind_addr.is_none() {
        loader.bind_addr = parse_env("BLAZE_BIND_ADDR", "must be an IP address")?;
    }
    if loader.port.is_none() {
        loader.port = parse_env("BLAZE_PORT", "must be a port number (0-65535)")?;
    }
    if loader.metrics_bind.is_none() {
        loader.metrics_bind =
            parse_env("BLAZE_METRICS_BIND", "must be a socket address (e.g. 127.0.0.1:9090)")?;
    }
    if loader.cookie_secret.is_none() {
        loader.cookie_secret =
            env_var_or_none("BLAZE_COOKIE_SECRET").map(|s| SecretString::new(s.into()));
    }

    // Poll loop
    if loader.max_wait_secs.is_none() {
        loader.max_wait_secs = parse_env(
            "BLAZE_MAX_WAIT_SECS",
            "must be an integer number of seconds (negative disables the limit)",
        )?;
    }
    if loader.poll_interval.is_none() {
        loader.poll_interval =
            parse_env::<u64>("BLAZE_POLL_INTERVAL_MS", "must be a number of milliseconds")?
                .map(Duration::from_millis);
    }
    if loader.batch_size.is_none() {
        loader.batch_size = parse_env("BLAZE_BATCH_SIZE", "must be a positive integer")?;
    }
    if loader.max_lines.is_none() {
        loader.max_lines = parse_env("BLAZE_MAX_LINES", "must be a positive integer")?;
    }

    Ok(())
}
