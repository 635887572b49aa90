// Application state module
// Read-only state shared by every connection

use std::time::Instant;

use hyper::header::InvalidHeaderValue;

use super::types::Config;
use crate::http::CorsPolicy;

/// Application state
pub struct AppState {
    pub config: Config,
    /// CORS headers prepared once from `config.cors`
    pub cors: CorsPolicy,
    /// Process start, reported as uptime by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Create `AppState`, validating the configured CORS header values
    pub fn new(config: Config) -> Result<Self, InvalidHeaderValue> {
        let cors = CorsPolicy::from_config(&config.cors)?;

        Ok(Self {
            config,
            cors,
            started_at: Instant::now(),
        })
    }

    /// Seconds elapsed since the state was created
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
