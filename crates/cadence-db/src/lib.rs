//! Cadence DB - Subscription persistence
//!
//! SQLx-based storage layer for Cadence services.
//!
//! # Example
//!
//! ```rust,ignore
//! use cadence_db::{create_pool, run_migrations, Repositories, SubscriptionRepository};
//!
//! let pool = create_pool("postgres://localhost/cadence").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let current = repos.subscriptions.find_auto_renewing_by_user_id(42).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
