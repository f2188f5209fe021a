//! Configuration for the Subscription API service.

use cadence_db::PoolOptions;
use cadence_lifecycle::SchedulerConfig;
use chrono::NaiveTime;
use std::time::Duration;

/// Subscription API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Database pool options
    pub pool: PoolOptions,
    /// Apply embedded migrations on startup
    pub run_migrations: bool,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
    /// Run the daily lifecycle sweep in this process
    pub sweep_enabled: bool,
    /// Daily sweep configuration
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("DATABASE_MAX_CONNECTIONS"))?;

        let run_migrations = parse_bool(&lookup, "RUN_MIGRATIONS", true)?;

        // Server port
        let http_port = lookup("HTTP_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Request timeout
        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = parse_bool(&lookup, "METRICS_ENABLED", true)?;

        // Daily sweep
        let sweep_enabled = parse_bool(&lookup, "SWEEP_ENABLED", true)?;
        let run_at = match lookup("SWEEP_RUN_AT") {
            Some(value) => NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .map_err(|_| ConfigError::Invalid("SWEEP_RUN_AT"))?,
            None => NaiveTime::MIN,
        };

        Ok(Self {
            http_port,
            database_url,
            pool: PoolOptions {
                max_connections,
                ..PoolOptions::default()
            },
            run_migrations,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
            sweep_enabled,
            scheduler: SchedulerConfig::new(run_at),
        })
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| ConfigError::Invalid(key)),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
