//! Scheduler configuration

use chrono::NaiveTime;

/// Daily sweep configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Server-local wall-clock time at which the sweep runs
    pub run_at: NaiveTime,
}

impl SchedulerConfig {
    /// Create a config that runs at `run_at` every day
    pub fn new(run_at: NaiveTime) -> Self {
        Self { run_at }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            run_at: NaiveTime::MIN,
        }
    }
}
