//! Application State
//!
//! Shared state for the JIA API service.

use chrono::{DateTime, Utc};
use jia_executor::{IdentityProvider, JiaExecutor};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Listen address
    pub listen_addr: String,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "jia-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            enable_cors: true,
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Configuration
    pub config: ApiConfig,
    /// Orchestration facade
    pub executor: Arc<JiaExecutor>,
    /// Fallback actor source for requests that do not carry one
    pub identity: Arc<dyn IdentityProvider>,
    /// Service start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state with default config
    pub fn new(executor: JiaExecutor, identity: Arc<dyn IdentityProvider>) -> Self {
        Self::with_config(ApiConfig::default(), executor, identity)
    }

    /// Create with configuration
    pub fn with_config(
        config: ApiConfig,
        executor: JiaExecutor,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            executor: Arc::new(executor),
            identity,
            started_at: Utc::now(),
        }
    }

    /// Get service uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        let now = Utc::now();
        (now - self.started_at).num_seconds().max(0) as u64
    }
}
