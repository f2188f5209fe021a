//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DbResult;
use crate::models::*;

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the auto-renewing subscription for a user
    async fn find_auto_renewing_by_user_id(&self, user_id: i64)
        -> DbResult<Option<SubscriptionRow>>;

    /// Find the user's most recent subscription, preferring any that has not expired
    async fn find_latest_by_user_id(&self, user_id: i64) -> DbResult<Option<SubscriptionRow>>;

    /// Find subscriptions with `status` whose end date is on or before `cutoff`
    async fn find_due_with_status(
        &self,
        cutoff: NaiveDate,
        status: &str,
    ) -> DbResult<Vec<SubscriptionRow>>;

    /// Find every stored subscription
    async fn find_all(&self) -> DbResult<Vec<SubscriptionRow>>;

    /// Insert or update one subscription
    async fn save(&self, sub: SaveSubscription) -> DbResult<SubscriptionRow>;

    /// Insert or update several subscriptions in one transaction, in order.
    ///
    /// Either every write is committed or none is.
    async fn save_all(&self, subs: Vec<SaveSubscription>) -> DbResult<Vec<SubscriptionRow>>;
}
