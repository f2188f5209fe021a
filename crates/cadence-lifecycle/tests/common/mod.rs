//! Common test utilities for cadence-lifecycle integration tests

pub mod mock_repos;

use cadence_types::FixedClock;
use chrono::NaiveDate;
use std::sync::Arc;

#[allow(unused_imports)]
pub use mock_repos::MockSubscriptionRepository;

/// Build a date, panicking on invalid input
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A clock pinned to `today`
#[allow(dead_code)]
pub fn clock_at(today: NaiveDate) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(today))
}
