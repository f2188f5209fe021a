//! Daily lifecycle sweep
//!
//! Once a day every subscription whose end date has arrived is either renewed
//! (ACTIVE with auto-renew) or expired. Each item is reconciled on its own:
//! a failure is logged and recorded in the [`SweepReport`] and the pass moves
//! on to the next item.

use cadence_db::{DbError, SaveSubscription, SubscriptionRepository, SubscriptionRow};
use cadence_types::{Clock, Subscription, SubscriptionId, SubscriptionStatus, UserId};
use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;

use crate::{LifecycleError, LifecycleResult, SchedulerConfig};

/// What the sweep did with one due subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The record expired and a successor term was stored
    Renewed {
        expired: Subscription,
        successor: Subscription,
    },
    /// The record expired without a successor
    Expired(Subscription),
}

/// Result of reconciling one subscription
#[derive(Debug)]
pub struct ItemOutcome {
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub result: Result<Reconciliation, LifecycleError>,
}

/// Summary of one sweep
#[derive(Debug)]
pub struct SweepReport {
    /// Date the sweep treated as "today"
    pub run_date: NaiveDate,
    /// Per-item outcomes, in processing order
    pub outcomes: Vec<ItemOutcome>,
}

impl SweepReport {
    /// Number of subscriptions renewed
    pub fn renewed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(Reconciliation::Renewed { .. })))
            .count()
    }

    /// Number of subscriptions expired without renewal
    pub fn expired(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(Reconciliation::Expired(_))))
            .count()
    }

    /// Number of subscriptions that could not be processed
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Items that could not be processed
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

/// Lifecycle scheduler
pub struct LifecycleScheduler<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl<R: SubscriptionRepository + ?Sized> LifecycleScheduler<R> {
    /// Create a new scheduler
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        Self {
            repo,
            clock,
            config,
        }
    }

    /// Run the sweep forever, once per day at the configured time.
    pub async fn run_daily(&self) {
        tracing::info!(run_at = %self.config.run_at, "Lifecycle scheduler started");

        loop {
            let wait = until_next_run(Local::now().naive_local(), self.config.run_at);
            tracing::debug!(wait_secs = wait.as_secs(), "Waiting for next lifecycle sweep");
            tokio::time::sleep(wait).await;

            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Lifecycle sweep could not load due subscriptions");
            }
        }
    }

    /// Reconcile every due ACTIVE and CANCELLED subscription once.
    ///
    /// Only a failure to load the due subscriptions is returned as an error;
    /// per-item failures are captured in the report.
    pub async fn run_once(&self) -> LifecycleResult<SweepReport> {
        let today = self.clock.today();
        tracing::info!(date = %today, "Starting daily subscription lifecycle sweep");

        let mut due = self
            .repo
            .find_due_with_status(today, SubscriptionStatus::Active.as_str())
            .await?;
        due.extend(
            self.repo
                .find_due_with_status(today, SubscriptionStatus::Cancelled.as_str())
                .await?,
        );

        let mut outcomes = Vec::with_capacity(due.len());
        for row in due {
            let subscription_id = row.subscription_id();
            let user_id = row.user_id();

            let result = self.reconcile(row, today).await;
            record_outcome(subscription_id, user_id, &result);

            outcomes.push(ItemOutcome {
                subscription_id,
                user_id,
                result,
            });
        }

        let report = SweepReport {
            run_date: today,
            outcomes,
        };

        tracing::info!(
            date = %today,
            renewed = report.renewed(),
            expired = report.expired(),
            failed = report.failed(),
            "Subscription lifecycle sweep finished"
        );

        Ok(report)
    }

    async fn reconcile(&self, row: SubscriptionRow, today: NaiveDate) -> LifecycleResult<Reconciliation> {
        let mut sub = row.into_domain()?;

        if sub.auto_renew() && sub.status() == SubscriptionStatus::Active {
            let successor = sub.renew(today)?;
            sub.expire(today);

            let mut rows = self
                .repo
                .save_all(vec![
                    SaveSubscription::from(&sub),
                    SaveSubscription::from(&successor),
                ])
                .await?;
            let successor = rows.pop().ok_or(DbError::NotFound)?.into_domain()?;
            let expired = rows.pop().ok_or(DbError::NotFound)?.into_domain()?;

            return Ok(Reconciliation::Renewed { expired, successor });
        }

        sub.expire(today);
        let saved = self
            .repo
            .save(SaveSubscription::from(&sub))
            .await?
            .into_domain()?;

        Ok(Reconciliation::Expired(saved))
    }
}

impl<R: ?Sized> std::fmt::Debug for LifecycleScheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleScheduler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn record_outcome(
    subscription_id: SubscriptionId,
    user_id: UserId,
    result: &Result<Reconciliation, LifecycleError>,
) {
    let outcome = match result {
        Ok(Reconciliation::Renewed { successor, .. }) => {
            tracing::info!(
                subscription_id = %subscription_id,
                user_id = %user_id,
                successor_id = ?successor.id(),
                "Subscription renewed"
            );
            "renewed"
        }
        Ok(Reconciliation::Expired(_)) => {
            tracing::info!(subscription_id = %subscription_id, user_id = %user_id, "Subscription expired");
            "expired"
        }
        Err(e) => {
            tracing::error!(
                subscription_id = %subscription_id,
                user_id = %user_id,
                error = %e,
                "Failed to process subscription"
            );
            "failed"
        }
    };

    metrics::counter!("subscription_sweep_items_total", "outcome" => outcome).increment(1);
}

/// Time to wait from `now` until the next occurrence of `run_at`.
///
/// A run time equal to `now` schedules for the following day.
pub fn until_next_run(now: NaiveDateTime, run_at: NaiveTime) -> Duration {
    let today_run = now.date().and_time(run_at);
    let next = if today_run > now {
        today_run
    } else {
        today_run
            .checked_add_days(Days::new(1))
            .unwrap_or(today_run)
    };
    (next - now).to_std().unwrap_or_default()
}
