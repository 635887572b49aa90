//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//!
//! Output goes through `tracing`; the subscriber honours `RUST_LOG` and falls
//! back to `logging.level` from the configuration.

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target used for per-request access log lines
const ACCESS_TARGET: &str = "access";

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("API server running on http://{addr}");
    tracing::info!("Environment: {}", config.app.environment);
    tracing::info!("Authentication: App Service Easy Auth enabled");
    match config.server.workers {
        Some(workers) => tracing::info!("Worker threads: {workers}"),
        None => tracing::info!("Single-threaded runtime"),
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
}

pub fn log_endpoint(description: &str) {
    tracing::info!("  {description}");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_rejected(active: usize, max: u64) {
    tracing::warn!("Max connections reached: {active}/{max}. Connection rejected.");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_connection_timeout(secs: u64) {
    tracing::warn!("Connection timeout after {secs} seconds");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_headers(headers: &hyper::HeaderMap, show: bool) {
    if show {
        tracing::info!("[Headers] Count: {}", headers.len());
        for name in headers.keys() {
            tracing::info!("[Headers]   {name}");
        }
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, shutting down");
}

pub fn log_shutdown_complete(remaining_connections: usize) {
    if remaining_connections == 0 {
        tracing::info!("All connections drained, exiting");
    } else {
        tracing::warn!("Grace period elapsed with {remaining_connections} connection(s) still open");
    }
}
