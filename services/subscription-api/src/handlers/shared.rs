//! Shared handler utilities
//!
//! Path validation and metrics helpers used by every subscription handler.

use std::time::Instant;

use cadence_types::{SubscriptionError, UserId};

use crate::error::ApiError;

/// Parse a `{userId}` path segment.
///
/// Only positive integers identify a user; anything else is rejected as an
/// invalid subscription request rather than a routing failure.
pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    match UserId::parse(raw) {
        Ok(id) if id.0 > 0 => Ok(id),
        _ => Err(SubscriptionError::invalid(format!("Invalid user ID: {raw}")).into()),
    }
}

/// Record operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "subscription_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id_valid() {
        assert_eq!(parse_user_id("42").unwrap(), UserId(42));
        assert_eq!(parse_user_id(" 7 ").unwrap(), UserId(7));
    }

    #[test]
    fn test_parse_user_id_invalid() {
        assert!(parse_user_id("").is_err());
        assert!(parse_user_id("abc").is_err());
        assert!(parse_user_id("0").is_err());
        assert!(parse_user_id("-3").is_err());
        assert!(parse_user_id("99999999999999999999").is_err());
    }
}
