//! Subscription domain errors

use thiserror::Error;

/// Errors raised by subscription construction and transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// A construction invariant was violated, or the user already holds an
    /// auto-renewing subscription
    #[error("{0}")]
    InvalidSubscription(String),

    /// Cancel was attempted on a subscription that is not active
    #[error("Active subscriptions cannot be cancelled")]
    CannotBeCanceled,

    /// Renew was attempted on a subscription that is not active and auto-renewing
    #[error("This subscription does not meet the renewal requirements")]
    CannotBeRenewed,

    /// No auto-renewing subscription exists for the user
    #[error("The subscription was not found")]
    DoesNotExist,
}

impl SubscriptionError {
    /// Shorthand for an [`SubscriptionError::InvalidSubscription`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSubscription(message.into())
    }

    /// Stable name of the error kind, as exposed to API clients
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSubscription(_) => "InvalidSubscription",
            Self::CannotBeCanceled => "SubscriptionCannotBeCanceled",
            Self::CannotBeRenewed => "SubscriptionCannotBeRenewed",
            Self::DoesNotExist => "SubscriptionDoesNotExist",
        }
    }

    /// Check if this is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DoesNotExist)
    }
}
