//! Mock repositories for testing

use async_trait::async_trait;
use cadence_db::{DbError, DbResult, SaveSubscription, SubscriptionRepository, SubscriptionRow};
use chrono::{NaiveDate, Utc};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory subscription repository for testing.
///
/// Mirrors the PostgreSQL schema closely enough for lifecycle tests: ids are
/// assigned on insert, at most one auto-renewing row per user is allowed, and
/// `save_all` applies either every write or none.
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    rows: Arc<DashMap<i64, SubscriptionRow>>,
    next_id: Arc<AtomicI64>,
    persists: Arc<AtomicUsize>,
    failing_ids: Arc<DashSet<i64>>,
    write_lock: Arc<Mutex<()>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing the persist counter
    #[allow(dead_code)]
    pub fn insert_row(&self, row: SubscriptionRow) {
        self.next_id.fetch_max(row.id, Ordering::SeqCst);
        self.rows.insert(row.id, row);
    }

    /// Build and insert a stored row
    #[allow(dead_code, clippy::too_many_arguments)]
    pub fn insert(
        &self,
        id: i64,
        user_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        plan: &str,
        status: &str,
        auto_renew: bool,
    ) {
        let row = SaveSubscription {
            id: Some(id),
            user_id,
            start_date,
            end_date,
            plan: plan.to_string(),
            status: status.to_string(),
            auto_renew,
        }
        .into_row(id, Utc::now());
        self.insert_row(row);
    }

    /// Make every write touching row `id` fail with a database error
    #[allow(dead_code)]
    pub fn fail_writes_for(&self, id: i64) {
        self.failing_ids.insert(id);
    }

    /// Number of rows written through `save` / `save_all`
    #[allow(dead_code)]
    pub fn persist_count(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }

    /// Fetch a stored row by id
    #[allow(dead_code)]
    pub fn row(&self, id: i64) -> Option<SubscriptionRow> {
        self.rows.get(&id).map(|r| r.value().clone())
    }

    /// All stored rows for a user, ordered by id
    #[allow(dead_code)]
    pub fn rows_for_user(&self, user_id: i64) -> Vec<SubscriptionRow> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    /// Validate and apply a batch of writes atomically
    fn apply(&self, subs: Vec<SaveSubscription>) -> DbResult<Vec<SubscriptionRow>> {
        let _guard = self.write_lock.lock().unwrap();

        // stage on a copy so a failure leaves the store untouched
        let mut staged: std::collections::BTreeMap<i64, SubscriptionRow> = self
            .rows
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        let mut next_id = self.next_id.load(Ordering::SeqCst);
        let mut written = Vec::with_capacity(subs.len());

        for sub in subs {
            if let Some(id) = sub.id {
                if self.failing_ids.contains(&id) {
                    return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
                }
            }

            let row = match sub.id {
                Some(id) => {
                    let existing = staged.get(&id).ok_or(DbError::NotFound)?;
                    let created_at = existing.created_at;
                    let mut row = sub.into_row(id, Utc::now());
                    row.created_at = created_at;
                    row
                }
                None => {
                    next_id += 1;
                    sub.into_row(next_id, Utc::now())
                }
            };

            if row.auto_renew
                && staged
                    .values()
                    .any(|r| r.id != row.id && r.user_id == row.user_id && r.auto_renew)
            {
                return Err(DbError::Conflict(
                    "subscriptions_user_auto_renew_idx".to_string(),
                ));
            }

            staged.insert(row.id, row.clone());
            written.push(row);
        }

        self.next_id.store(next_id, Ordering::SeqCst);
        self.persists.fetch_add(written.len(), Ordering::SeqCst);
        for row in &written {
            self.rows.insert(row.id, row.clone());
        }
        Ok(written)
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_auto_renewing_by_user_id(
        &self,
        user_id: i64,
    ) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .rows
            .iter()
            .find(|r| r.user_id == user_id && r.auto_renew)
            .map(|r| r.value().clone()))
    }

    async fn find_latest_by_user_id(&self, user_id: i64) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .rows_for_user(user_id)
            .into_iter()
            .max_by_key(|r| (r.status != "EXPIRED", r.id)))
    }

    async fn find_due_with_status(
        &self,
        cutoff: NaiveDate,
        status: &str,
    ) -> DbResult<Vec<SubscriptionRow>> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|r| r.end_date <= cutoff && r.status == status)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn find_all(&self) -> DbResult<Vec<SubscriptionRow>> {
        let mut rows: Vec<_> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn save(&self, sub: SaveSubscription) -> DbResult<SubscriptionRow> {
        let mut rows = self.apply(vec![sub])?;
        rows.pop().ok_or(DbError::NotFound)
    }

    async fn save_all(&self, subs: Vec<SaveSubscription>) -> DbResult<Vec<SubscriptionRow>> {
        self.apply(subs)
    }
}
