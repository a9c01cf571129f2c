//! HTTP server for the Prometheus metrics endpoint.

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::source::Backend;
use crate::writer::WriteStats;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 9090).into(),
        }
    }
}

impl MetricsServerConfig {
    /// Creates a config with a custom port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }
}

/// State read at scrape time.
pub struct MetricsState {
    registry: MetricsRegistry,
    stats: Arc<WriteStats>,
    backend: Option<Backend>,
    seeded: bool,
}

impl MetricsState {
    /// Refreshes the registry from the live counters.
    fn refresh(&self) {
        let snapshot = MetricsSnapshot::capture(&self.stats, self.backend, self.seeded);
        self.registry.update(&snapshot);
    }
}

/// HTTP server exposing device metrics.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<RwLock<MetricsState>>,
}

impl MetricsServer {
    /// Creates a server over the device's shared counters.
    pub fn new(
        config: MetricsServerConfig,
        registry: MetricsRegistry,
        stats: Arc<WriteStats>,
        backend: Option<Backend>,
        seeded: bool,
    ) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                stats,
                backend,
                seeded,
            })),
        }
    }

    /// Starts the HTTP server and runs until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .with_state(self.state);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

async fn metrics_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> impl IntoResponse {
    let state = state.read().await;
    state.refresh();

    match state.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9090);
        assert!(config.bind_addr.ip().is_loopback());
    }

    #[test]
    fn test_refresh_reads_live_counters() {
        let stats = Arc::new(WriteStats::new());
        let state = MetricsState {
            registry: MetricsRegistry::new().unwrap(),
            stats: Arc::clone(&stats),
            backend: Some(Backend::Hardware),
            seeded: false,
        };

        stats.record_bytes(12);
        state.refresh();

        let output = state.registry.encode().unwrap();
        assert!(output.contains("dev_random_bytes_written_total 12"));
        assert!(output.contains("dev_random_active_backend 1"));
    }
}
