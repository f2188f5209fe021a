//! Subscription service
//!
//! Request-driven lifecycle operations. A user's "current" subscription is
//! the one with auto-renew set; the repository lookup encodes that rule and
//! the storage layer guarantees there is at most one.

use cadence_db::{DbError, SaveSubscription, SubscriptionRepository};
use cadence_types::{Clock, Plan, Subscription, SubscriptionError, SubscriptionStatus, UserId};
use std::sync::Arc;

use crate::LifecycleResult;

/// Message returned with every successful cancellation
pub const CANCELLED_MESSAGE: &str = "Subscription cancelled";

/// Outcome of a cancellation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationSummary {
    /// Status after cancelling
    pub status: SubscriptionStatus,
    /// Human-readable outcome
    pub message: &'static str,
}

/// Subscription service
///
/// Provides unified interface for:
/// - Creating a user's first auto-renewing subscription
/// - Switching plans by replacing the current record
/// - Cancelling renewal
/// - Lookups and access checks
pub struct SubscriptionService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: SubscriptionRepository + ?Sized> SubscriptionService<R> {
    /// Create a new subscription service
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Start a subscription for a user who has no auto-renewing one.
    pub async fn create_subscription(
        &self,
        user_id: UserId,
        plan: Plan,
    ) -> LifecycleResult<Subscription> {
        if self
            .repo
            .find_auto_renewing_by_user_id(user_id.0)
            .await?
            .is_some()
        {
            return Err(SubscriptionError::invalid(
                "The user already has a subscription that will renew",
            )
            .into());
        }

        let sub = Subscription::new(user_id, plan, self.clock.today())?;
        let saved = self.repo.save(SaveSubscription::from(&sub)).await?.into_domain()?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan,
            subscription_id = ?saved.id(),
            "Subscription created"
        );

        Ok(saved)
    }

    /// Replace the user's current subscription with a fresh term on `new_plan`.
    ///
    /// Both writes are committed together; the old record ends today as
    /// CANCELLED and the returned record is the new ACTIVE one.
    pub async fn change_plan(
        &self,
        user_id: UserId,
        new_plan: Plan,
    ) -> LifecycleResult<Subscription> {
        let today = self.clock.today();
        let mut current = self.current(user_id).await?;
        let old_plan = current.plan();

        current.mark_as_replaced(today);
        let next = Subscription::new(user_id, new_plan, today)?;

        let mut rows = self
            .repo
            .save_all(vec![
                SaveSubscription::from(&current),
                SaveSubscription::from(&next),
            ])
            .await?;
        let saved = rows.pop().ok_or(DbError::NotFound)?.into_domain()?;

        tracing::info!(
            user_id = %user_id,
            from_plan = %old_plan,
            to_plan = %new_plan,
            "Subscription plan changed"
        );

        Ok(saved)
    }

    /// Stop renewal of the user's current subscription.
    pub async fn cancel_subscription(&self, user_id: UserId) -> LifecycleResult<CancellationSummary> {
        let mut current = self.current(user_id).await?;
        current.cancel()?;

        let saved = self
            .repo
            .save(SaveSubscription::from(&current))
            .await?
            .into_domain()?;

        tracing::info!(user_id = %user_id, subscription_id = ?saved.id(), "Subscription cancelled");

        Ok(CancellationSummary {
            status: saved.status(),
            message: CANCELLED_MESSAGE,
        })
    }

    /// Get the user's current subscription
    pub async fn get_subscription(&self, user_id: UserId) -> LifecycleResult<Subscription> {
        self.current(user_id).await
    }

    /// Get every stored subscription
    pub async fn get_all_subscriptions(&self) -> LifecycleResult<Vec<Subscription>> {
        let rows = self.repo.find_all().await?;
        let subs = rows
            .into_iter()
            .map(Subscription::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subs)
    }

    /// Whether the user may use the service today.
    ///
    /// Looks at the user's latest record that has not expired, so a
    /// cancelled subscription keeps access until its end date.
    pub async fn has_access(&self, user_id: UserId) -> LifecycleResult<bool> {
        let latest = self
            .repo
            .find_latest_by_user_id(user_id.0)
            .await?
            .ok_or(SubscriptionError::DoesNotExist)?
            .into_domain()?;
        Ok(latest.has_access(self.clock.today()))
    }

    async fn current(&self, user_id: UserId) -> LifecycleResult<Subscription> {
        let row = self
            .repo
            .find_auto_renewing_by_user_id(user_id.0)
            .await?
            .ok_or(SubscriptionError::DoesNotExist)?;
        Ok(row.into_domain()?)
    }
}

impl<R: ?Sized> std::fmt::Debug for SubscriptionService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionService").finish_non_exhaustive()
    }
}
