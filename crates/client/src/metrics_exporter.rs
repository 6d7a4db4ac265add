//! Prometheus metrics exporter.
//!
//! Installs `metrics-exporter-prometheus` as the global recorder and serves
//! everything recorded through the `metrics` facade (API call metrics from
//! this crate and stream metrics from the server) at `/metrics`.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use tracing::info;

use crate::metrics::METRIC_REQUEST_DURATION;

/// Histogram name the server uses for whole-stream duration.
pub const METRIC_STREAM_DURATION: &str = "splunkblaze_stream_duration_seconds";

/// Metrics exporter for Prometheus scraping.
///
/// Creating one installs a global PrometheusRecorder and starts an HTTP
/// listener on the given address.
#[derive(Debug)]
pub struct MetricsExporter {
    bind_addr: SocketAddr,
}

impl MetricsExporter {
    /// Install the Prometheus exporter as the global metrics recorder.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if another recorder is already installed, the
    /// listener cannot bind, or the exporter cannot be built.
    pub fn install(bind_addr: SocketAddr) -> Result<Self, MetricsExporterError> {
        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(METRIC_REQUEST_DURATION.to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )?
            .set_buckets_for_metric(
                Matcher::Full(METRIC_STREAM_DURATION.to_string()),
                &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0],
            )?
            .with_http_listener(bind_addr)
            .install()?;

        info!(
            "Prometheus metrics exporter started on http://{}/metrics",
            bind_addr
        );

        Ok(Self { bind_addr })
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

/// Errors that can occur when installing the metrics exporter.
#[derive(Debug, thiserror::Error)]
pub enum MetricsExporterError {
    /// Failed to build or install the Prometheus recorder, including when
    /// another global recorder is already installed.
    #[error("Failed to build Prometheus recorder: {0}")]
    BuildError(String),
}

impl From<metrics_exporter_prometheus::BuildError> for MetricsExporterError {
    fn from(err: metrics_exporter_prometheus::BuildError) -> Self {
        MetricsExporterError::BuildError(err.to_string())
    }
}
