//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::Config;
use crate::report::ReportEngine;
use crate::store::RecordStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Report engine over the record store
    pub engine: Arc<ReportEngine>,
    /// Record store, used directly for caller lookup and health checks
    pub store: Arc<dyn RecordStore>,
    /// Service configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            engine: Arc::new(ReportEngine::new(Arc::clone(&store))),
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Whether error responses carry internal details
    pub fn exposes_error_details(&self) -> bool {
        self.config.api.environment.is_development()
    }
}
