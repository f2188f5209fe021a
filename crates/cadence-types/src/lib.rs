//! Cadence Types - Subscription domain model
//!
//! This crate contains the domain types shared by Cadence services:
//! - User and subscription identifiers
//! - Subscription plans
//! - The subscription entity and its lifecycle transitions
//! - The injected clock used to evaluate "today"

pub mod clock;
pub mod error;
pub mod plan;
pub mod subscription;
pub mod user;

pub use clock::*;
pub use error::*;
pub use plan::*;
pub use subscription::*;
pub use user::*;
