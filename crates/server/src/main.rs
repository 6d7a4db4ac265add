//! splunkblaze - stream Splunk search results to the browser.
//!
//! Responsibilities:
//! - Assemble configuration from flags, environment, `.env` and defaults.
//! - Obtain the shared Splunk credential once, then serve HTTP until Ctrl-C.
//!
//! Invariants:
//! - `load_dotenv()` runs BEFORE CLI parsing so `.env` can feed clap env defaults.
//! - The process does not listen unless login succeeded.

mod args;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use splunkblaze_client::{JobApi, MetricsCollector, MetricsExporter, SplunkClient};
use splunkblaze_config::{Config, ConfigLoader};
use splunkblaze_server::{AppState, serve};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loader = ConfigLoader::new()
        .load_dotenv()
        .context("Failed to load environment")?;

    let cli = Cli::parse();
    logging::init(cli.log_format);

    let config = build_config(loader, &cli)?;
    if config.server.cookie_secret.is_none() {
        info!("No BLAZE_COOKIE_SECRET set; search form tokens are valid until restart");
    }
    if config.is_using_default_credentials() {
        warn!("Using default Splunk credentials (admin/changeme). Set SPLUNK_USERNAME/SPLUNK_PASSWORD or SPLUNK_API_TOKEN.");
    }

    let _metrics_exporter = config
        .server
        .metrics_bind
        .map(MetricsExporter::install)
        .transpose()
        .context("Failed to start metrics exporter")?;
    let metrics = if config.server.metrics_bind.is_some() {
        MetricsCollector::new()
    } else {
        MetricsCollector::disabled()
    };

    let client = SplunkClient::builder()
        .from_config(&config)
        .metrics(metrics)
        .connect()
        .await
        .with_context(|| format!("Failed to connect to Splunk at {}", config.connection.base_url))?;
    info!(base_url = %client.base_url(), api_token = client.is_api_token_auth(), "Connected to Splunk");

    let api: Arc<dyn JobApi> = Arc::new(client);
    let state = Arc::new(AppState::from_config(api, &config));

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
    .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

/// Layer CLI flags over the environment and build the final config.
fn build_config(loader: ConfigLoader, cli: &Cli) -> anyhow::Result<Config> {
    let mut loader = loader
        .from_env()
        .context("Failed to load configuration from environment")?;

    if let Some(ref url) = cli.base_url {
        loader = loader.with_base_url(url.clone());
    }
    if let Some(ref username) = cli.username {
        loader = loader.with_username(username.clone());
    }
    if let Some(ref password) = cli.password {
        loader = loader.with_password(password.clone());
    }
    if let Some(ref token) = cli.api_token {
        loader = loader.with_api_token(token.clone());
    }
    if let Some(timeout_secs) = cli.timeout {
        loader = loader.with_timeout(Duration::from_secs(timeout_secs));
    }
    if let Some(retries) = cli.max_retries {
        loader = loader.with_max_retries(retries);
    }
    if cli.skip_verify {
        loader = loader.with_skip_verify(true);
    }
    if let Some(bind) = cli.bind {
        loader = loader.with_bind_addr(bind);
    }
    if let Some(port) = cli.port {
        loader = loader.with_port(port);
    }
    if let Some(metrics_bind) = cli.metrics_bind {
        loader = loader.with_metrics_bind(metrics_bind);
    }
    if let Some(ref secret) = cli.cookie_secret {
        loader = loader.with_cookie_secret(secret.clone());
    }
    if let Some(secs) = cli.max_wait {
        loader = loader.with_max_wait_secs(secs);
    }
    if let Some(ms) = cli.poll_interval_ms {
        loader = loader.with_poll_interval(Duration::from_millis(ms));
    }
    if let Some(size) = cli.batch_size {
        loader = loader.with_batch_size(size);
    }
    if let Some(lines) = cli.max_lines {
        loader = loader.with_max_lines(lines);
    }

    loader.build().context("Failed to build configuration")
}
