//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};

use crate::error::{DbError, DbResult};
use crate::models::{SaveSubscription, SubscriptionRow};
use crate::repo::SubscriptionRepository;

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn write(conn: &mut PgConnection, sub: &SaveSubscription) -> DbResult<SubscriptionRow> {
    match sub.id {
        None => sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (user_id, start_date, end_date, plan, status, auto_renew)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, start_date, end_date, plan, status, auto_renew,
                      created_at, updated_at
            "#,
        )
        .bind(sub.user_id)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .bind(&sub.plan)
        .bind(&sub.status)
        .bind(sub.auto_renew)
        .fetch_one(&mut *conn)
        .await
        .map_err(DbError::from_write),

        Some(id) => sqlx::query_as::<_, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET user_id = $2, start_date = $3, end_date = $4, plan = $5, status = $6,
                auto_renew = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, start_date, end_date, plan, status, auto_renew,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(sub.user_id)
        .bind(sub.start_date)
        .bind(sub.end_date)
        .bind(&sub.plan)
        .bind(&sub.status)
        .bind(sub.auto_renew)
        .fetch_optional(&mut *conn)
        .await
        .map_err(DbError::from_write)?
        .ok_or(DbError::NotFound),
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_auto_renewing_by_user_id(
        &self,
        user_id: i64,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, start_date, end_date, plan, status, auto_renew,
                   created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1 AND auto_renew
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_latest_by_user_id(&self, user_id: i64) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, start_date, end_date, plan, status, auto_renew,
                   created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY (status = 'EXPIRED'), id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_due_with_status(
        &self,
        cutoff: NaiveDate,
        status: &str,
    ) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, start_date, end_date, plan, status, auto_renew,
                   created_at, updated_at
            FROM subscriptions
            WHERE end_date <= $1 AND status = $2
            ORDER BY id
            "#,
        )
        .bind(cutoff)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn find_all(&self) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT id, user_id, start_date, end_date, plan, status, auto_renew,
                   created_at, updated_at
            FROM subscriptions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn save(&self, sub: SaveSubscription) -> DbResult<SubscriptionRow> {
        let mut conn = self.pool.acquire().await?;
        write(&mut *conn, &sub).await
    }

    async fn save_all(&self, subs: Vec<SaveSubscription>) -> DbResult<Vec<SubscriptionRow>> {
        let mut tx = self.pool.begin().await?;

        let mut rows = Vec::with_capacity(subs.len());
        for sub in &subs {
            // an early return drops `tx`, which rolls back
            rows.push(write(&mut *tx, sub).await?);
        }

        tx.commit().await?;
        Ok(rows)
    }
}
