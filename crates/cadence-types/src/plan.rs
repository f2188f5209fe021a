//! Subscription plan types

use serde::{Deserialize, Serialize};

use crate::SubscriptionError;

/// Service tiers a user can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    /// Single-listener premium tier
    Premium,
    /// Shared household tier
    Family,
}

impl Plan {
    /// All plans accepted by the service
    pub const ALL: [Plan; 2] = [Plan::Premium, Plan::Family];

    /// Canonical storage and wire name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "PREMIUM",
            Self::Family => "FAMILY",
        }
    }

    /// Parse a plan supplied by a caller, treating a missing value as an
    /// invalid subscription.
    pub fn from_input(value: Option<&str>) -> Result<Self, SubscriptionError> {
        match value {
            None => Err(SubscriptionError::invalid("The plan is mandatory")),
            Some(s) => s.parse().map_err(|_| {
                SubscriptionError::invalid("The plan must be PREMIUM or FAMILY")
            }),
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Plan {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PREMIUM" => Ok(Self::Premium),
            "FAMILY" => Ok(Self::Family),
            _ => Err(PlanParseError(s.to_string())),
        }
    }
}

/// Error parsing a plan string
#[derive(Debug, Clone)]
pub struct PlanParseError(pub String);

impl std::fmt::Display for PlanParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid plan: {}", self.0)
    }
}

impl std::error::Error for PlanParseError {}
