//! Application state for the Subscription API service.

use cadence_db::{DbPool, SubscriptionRepository};
use cadence_lifecycle::SubscriptionService;
use std::sync::Arc;

use crate::config::Config;

/// Service type shared by handlers
pub type Subscriptions = SubscriptionService<dyn SubscriptionRepository>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Subscription lifecycle operations
    pub subscriptions: Arc<Subscriptions>,
    /// Database pool (readiness checks)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(subscriptions: Subscriptions, pool: DbPool, config: Config) -> Self {
        Self {
            subscriptions: Arc::new(subscriptions),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
