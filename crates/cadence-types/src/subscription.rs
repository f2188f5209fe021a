//! Subscription entity and lifecycle state machine
//!
//! A [`Subscription`] is only ever mutated through its transition methods.
//! Every method that depends on the current date takes `today` explicitly so
//! callers decide which clock is authoritative.
//!
//! ```text
//!            cancel / mark_as_replaced
//!   ACTIVE ─────────────────────────────▶ CANCELLED
//!     │                                      │
//!     │ expire (end_date <= today)           │ expire (end_date <= today)
//!     ▼                                      ▼
//!   EXPIRED ◀────────────────────────────────┘
//! ```
//!
//! `renew` never changes the receiver; it produces the successor record.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Plan, SubscriptionError, SubscriptionId, UserId};

/// Length of one subscription term in days
pub const TERM_DAYS: u64 = 30;

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Subscription is running
    Active,
    /// Subscription will not renew; access continues until the end date
    Cancelled,
    /// Subscription has ended (terminal)
    Expired,
}

impl SubscriptionStatus {
    /// Canonical storage and wire name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "CANCELLED" | "CANCELED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            _ => Err(SubscriptionError::invalid(format!(
                "Unknown subscription status: {s}"
            ))),
        }
    }
}

/// Raw field values for rehydrating a subscription.
///
/// Any field may be missing; [`Subscription::restore`] decides whether the
/// combination is acceptable.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionParts {
    pub id: Option<SubscriptionId>,
    pub user_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub plan: Option<Plan>,
    pub status: Option<SubscriptionStatus>,
    pub auto_renew: bool,
}

/// A user's subscription to a plan for a date window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    id: Option<SubscriptionId>,
    user_id: UserId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    plan: Plan,
    status: SubscriptionStatus,
    auto_renew: bool,
}

impl Subscription {
    /// Start a fresh term for `user_id` on `plan`, beginning `today`.
    pub fn new(user_id: UserId, plan: Plan, today: NaiveDate) -> Result<Self, SubscriptionError> {
        Self::restore(SubscriptionParts {
            id: None,
            user_id: Some(user_id),
            start_date: Some(today),
            end_date: Some(term_end(today)?),
            plan: Some(plan),
            status: Some(SubscriptionStatus::Active),
            auto_renew: true,
        })
    }

    /// Rebuild a subscription from stored values
    pub fn restore(parts: SubscriptionParts) -> Result<Self, SubscriptionError> {
        let user_id = parts
            .user_id
            .ok_or_else(|| SubscriptionError::invalid("User ID is required"))?;
        let plan = parts
            .plan
            .ok_or_else(|| SubscriptionError::invalid("The plan is mandatory"))?;
        let status = parts
            .status
            .ok_or_else(|| SubscriptionError::invalid("Status is mandatory"))?;
        let (Some(start_date), Some(end_date)) = (parts.start_date, parts.end_date) else {
            return Err(SubscriptionError::invalid("Dates are mandatory"));
        };
        if end_date < start_date {
            return Err(SubscriptionError::invalid(
                "The end date cannot be earlier than the start date",
            ));
        }
        if parts.auto_renew && status != SubscriptionStatus::Active {
            return Err(SubscriptionError::invalid(
                "Only active subscriptions can renew automatically",
            ));
        }

        Ok(Self {
            id: parts.id,
            user_id,
            start_date,
            end_date,
            plan,
            status,
            auto_renew: parts.auto_renew,
        })
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Stop renewal at the user's request. Access continues until `end_date`.
    pub fn cancel(&mut self) -> Result<(), SubscriptionError> {
        if self.status != SubscriptionStatus::Active {
            return Err(SubscriptionError::CannotBeCanceled);
        }
        self.status = SubscriptionStatus::Cancelled;
        self.auto_renew = false;
        Ok(())
    }

    /// End this record early because another one supersedes it.
    pub fn mark_as_replaced(&mut self, today: NaiveDate) {
        self.status = SubscriptionStatus::Cancelled;
        self.auto_renew = false;
        // never before start_date
        self.end_date = today.max(self.start_date);
    }

    /// Produce the next term for an active, auto-renewing subscription.
    ///
    /// The receiver is left untouched; callers expire it separately.
    pub fn renew(&self, today: NaiveDate) -> Result<Subscription, SubscriptionError> {
        if self.status == SubscriptionStatus::Active && self.auto_renew {
            return Subscription::new(self.user_id, self.plan, today);
        }
        Err(SubscriptionError::CannotBeRenewed)
    }

    /// Expire the subscription if its term is over.
    ///
    /// Returns `true` when the status changed.
    pub fn expire(&mut self, today: NaiveDate) -> bool {
        if self.status == SubscriptionStatus::Expired || !self.is_due(today) {
            return false;
        }
        self.status = SubscriptionStatus::Expired;
        self.auto_renew = false;
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether the user may still use the service
    pub fn has_access(&self, today: NaiveDate) -> bool {
        self.status != SubscriptionStatus::Expired && self.end_date >= today
    }

    /// Whether the term has reached its end date
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.end_date <= today
    }

    pub fn id(&self) -> Option<SubscriptionId> {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    pub fn auto_renew(&self) -> bool {
        self.auto_renew
    }
}

fn term_end(start: NaiveDate) -> Result<NaiveDate, SubscriptionError> {
    start
        .checked_add_days(Days::new(TERM_DAYS))
        .ok_or_else(|| SubscriptionError::invalid("The end date is out of range"))
}
