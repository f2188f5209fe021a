//! Cadence Lifecycle - Subscription business logic
//!
//! Orchestrates the subscription state machine against a repository:
//! request-driven operations live in [`SubscriptionService`], the nightly
//! reconciliation pass lives in [`LifecycleScheduler`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cadence_lifecycle::{LifecycleScheduler, SchedulerConfig, SubscriptionService};
//! use cadence_types::{Plan, SystemClock, UserId};
//!
//! let repo = Arc::new(repos.subscriptions);
//! let clock = Arc::new(SystemClock);
//!
//! let service = SubscriptionService::new(repo.clone(), clock.clone());
//! let sub = service.create_subscription(UserId(1), Plan::Premium).await?;
//!
//! let scheduler = LifecycleScheduler::new(repo, clock, SchedulerConfig::default());
//! let report = scheduler.run_once().await?;
//! ```

pub mod config;
pub mod error;
pub mod scheduler;
pub mod service;

pub use config::SchedulerConfig;
pub use error::{LifecycleError, LifecycleResult};
pub use scheduler::{ItemOutcome, LifecycleScheduler, Reconciliation, SweepReport};
pub use service::{CancellationSummary, SubscriptionService};
