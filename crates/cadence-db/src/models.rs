//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! They are deliberately independent of the domain [`Subscription`]; the
//! conversions at the bottom of this file are the only bridge between them.

use cadence_types::{Subscription, SubscriptionError, SubscriptionId, SubscriptionParts, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: i64,
    pub user_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub plan: String,
    pub status: String,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write input for a subscription.
///
/// `id == None` inserts a new row; otherwise the existing row is updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSubscription {
    pub id: Option<i64>,
    pub user_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub plan: String,
    pub status: String,
    pub auto_renew: bool,
}

impl SubscriptionRow {
    /// Convert to domain SubscriptionId
    pub fn subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.id)
    }

    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }

    /// Rebuild the domain subscription, validating stored values
    pub fn into_domain(self) -> Result<Subscription, SubscriptionError> {
        let plan = self.plan.parse().map_err(|_| {
            SubscriptionError::invalid(format!(
                "Stored plan '{}' is not PREMIUM or FAMILY",
                self.plan
            ))
        })?;
        let status = self.status.parse()?;

        Subscription::restore(SubscriptionParts {
            id: Some(SubscriptionId(self.id)),
            user_id: Some(UserId(self.user_id)),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            plan: Some(plan),
            status: Some(status),
            auto_renew: self.auto_renew,
        })
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = SubscriptionError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        row.into_domain()
    }
}

impl From<&Subscription> for SaveSubscription {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: sub.id().map(|id| id.0),
            user_id: sub.user_id().0,
            start_date: sub.start_date(),
            end_date: sub.end_date(),
            plan: sub.plan().as_str().to_string(),
            status: sub.status().as_str().to_string(),
            auto_renew: sub.auto_renew(),
        }
    }
}

impl SaveSubscription {
    /// Materialize the row the database would hold after this write.
    ///
    /// Used by in-memory repositories; PostgreSQL returns the row itself.
    pub fn into_row(self, id: i64, now: DateTime<Utc>) -> SubscriptionRow {
        SubscriptionRow {
            id,
            user_id: self.user_id,
            start_date: self.start_date,
            end_date: self.end_date,
            plan: self.plan,
            status: self.status,
            auto_renew: self.auto_renew,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_types::{Plan, SubscriptionStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(plan: &str, status: &str) -> SubscriptionRow {
        SaveSubscription {
            id: None,
            user_id: 3,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            plan: plan.to_string(),
            status: status.to_string(),
            auto_renew: true,
        }
        .into_row(11, Utc::now())
    }

    #[test]
    fn test_row_into_domain() {
        let sub = Subscription::try_from(row("PREMIUM", "ACTIVE")).unwrap();
        assert_eq!(sub.id(), Some(SubscriptionId(11)));
        assert_eq!(sub.user_id(), UserId(3));
        assert_eq!(sub.plan(), Plan::Premium);
        assert_eq!(sub.status(), SubscriptionStatus::Active);
        assert!(sub.auto_renew());
    }

    #[test]
    fn test_row_with_unknown_plan_is_invalid() {
        let err = Subscription::try_from(row("GOLD", "ACTIVE")).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidSubscription(_)));
    }

    #[test]
    fn test_row_with_unknown_status_is_invalid() {
        let err = Subscription::try_from(row("FAMILY", "PAUSED")).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidSubscription(_)));
    }

    #[test]
    fn test_domain_into_write_record() {
        let mut sub = Subscription::new(UserId(5), Plan::Family, date(2024, 2, 1)).unwrap();
        sub.cancel().unwrap();

        let save = SaveSubscription::from(&sub);
        assert_eq!(save.id, None);
        assert_eq!(save.user_id, 5);
        assert_eq!(save.plan, "FAMILY");
        assert_eq!(save.status, "CANCELLED");
        assert!(!save.auto_renew);
        assert_eq!(save.end_date, date(2024, 3, 2));
    }
}
