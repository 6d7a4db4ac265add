//! Command-line arguments.
//!
//! Every flag can also come from the environment (or a `.env` file, loaded
//! before parsing). Unset flags fall through to the config loader defaults.

use std::net::{IpAddr, SocketAddr};

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "splunkblaze")]
#[command(about = "Stream Splunk search results to the browser as they arrive", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  splunkblaze --base-url https://splunk.example.com:8089 --api-token $SPLUNK_API_TOKEN\n  splunkblaze --port 8080 --max-wait -1 --batch-size 50\n"
)]
pub struct Cli {
    /// Base URL of the Splunk server (e.g., https://localhost:8089)
    #[arg(short, long, env = "SPLUNK_BASE_URL")]
    pub base_url: Option<String>,

    /// Username for session token authentication
    #[arg(short, long, env = "SPLUNK_USERNAME")]
    pub username: Option<String>,

    /// Password for session token authentication
    #[arg(short, long, env = "SPLUNK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// API token for authentication (preferred over username/password)
    #[arg(short, long, env = "SPLUNK_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SPLUNK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of retries for failed requests
    #[arg(long, env = "SPLUNK_MAX_RETRIES")]
    pub max_retries: Option<usize>,

    /// Skip TLS certificate verification (for self-signed certificates)
    #[arg(long, env = "SPLUNK_SKIP_VERIFY")]
    pub skip_verify: bool,

    /// Address to listen on
    #[arg(long, env = "BLAZE_BIND_ADDR")]
    pub bind: Option<IpAddr>,

    /// Port to listen on
    #[arg(long, env = "BLAZE_PORT")]
    pub port: Option<u16>,

    /// Seconds to keep a response open waiting for events; negative waits forever
    #[arg(long, env = "BLAZE_MAX_WAIT_SECS", allow_hyphen_values = true)]
    pub max_wait: Option<i64>,

    /// Milliseconds between status polls
    #[arg(long, env = "BLAZE_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Maximum events written per flush
    #[arg(long, env = "BLAZE_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Maximum lines Splunk renders per event
    #[arg(long, env = "BLAZE_MAX_LINES")]
    pub max_lines: Option<usize>,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, env = "BLAZE_METRICS_BIND")]
    pub metrics_bind: Option<SocketAddr>,

    /// Key for signing search form tokens (random per process when unset)
    #[arg(long, env = "BLAZE_COOKIE_SECRET", hide_env_values = true)]
    pub cookie_secret: Option<String>,

    /// Log output format
    #[arg(long, env = "BLAZE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
