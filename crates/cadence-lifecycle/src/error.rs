//! Lifecycle errors

use cadence_db::DbError;
use cadence_types::SubscriptionError;
use thiserror::Error;

/// Lifecycle errors
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Domain rule violated
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Database error
    #[error("database error: {0}")]
    Database(DbError),
}

/// Result alias for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

impl From<DbError> for LifecycleError {
    fn from(err: DbError) -> Self {
        match err {
            // the partial unique index on auto-renewing rows is the final word
            // on duplicates when two creations race
            DbError::Conflict(_) => Self::Subscription(SubscriptionError::invalid(
                "The user already has a subscription that will renew",
            )),
            other => Self::Database(other),
        }
    }
}

impl LifecycleError {
    /// The domain error, if this is one
    pub fn as_subscription_error(&self) -> Option<&SubscriptionError> {
        match self {
            Self::Subscription(e) => Some(e),
            Self::Database(_) => None,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        self.as_subscription_error()
            .is_some_and(SubscriptionError::is_not_found)
    }
}
