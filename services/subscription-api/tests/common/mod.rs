//! Shared fixtures for API tests

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use cadence_db::{DbError, DbResult, SaveSubscription, SubscriptionRepository, SubscriptionRow};
use cadence_lifecycle::SubscriptionService;
use cadence_types::{Clock, FixedClock};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use subscription_api::{build_router, AppState, Config};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory subscription store with the same auto-renew uniqueness rule as
/// the PostgreSQL schema.
#[derive(Default, Clone)]
pub struct InMemorySubscriptions {
    rows: Arc<DashMap<i64, SubscriptionRow>>,
    next_id: Arc<AtomicI64>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySubscriptions {
    /// Make every subsequent call fail as if the database were down
    pub fn go_down(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn rows(&self) -> Vec<SubscriptionRow> {
        let mut rows: Vec<_> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|r| r.id);
        rows
    }

    fn check(&self) -> DbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn write(&self, sub: SaveSubscription) -> DbResult<SubscriptionRow> {
        let id = match sub.id {
            Some(id) => id,
            None => self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        };
        let row = sub.into_row(id, Utc::now());
        if row.auto_renew
            && self
                .rows
                .iter()
                .any(|r| r.id != id && r.user_id == row.user_id && r.auto_renew)
        {
            return Err(DbError::Conflict(
                "subscriptions_user_auto_renew_idx".to_string(),
            ));
        }
        self.rows.insert(id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptions {
    async fn find_auto_renewing_by_user_id(
        &self,
        user_id: i64,
    ) -> DbResult<Option<SubscriptionRow>> {
        self.check()?;
        Ok(self
            .rows
            .iter()
            .find(|r| r.user_id == user_id && r.auto_renew)
            .map(|r| r.value().clone()))
    }

    async fn find_latest_by_user_id(&self, user_id: i64) -> DbResult<Option<SubscriptionRow>> {
        self.check()?;
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| (r.status != "EXPIRED", r.id)))
    }

    async fn find_due_with_status(
        &self,
        cutoff: NaiveDate,
        status: &str,
    ) -> DbResult<Vec<SubscriptionRow>> {
        self.check()?;
        Ok(self
            .rows()
            .into_iter()
            .filter(|r| r.end_date <= cutoff && r.status == status)
            .collect())
    }

    async fn find_all(&self) -> DbResult<Vec<SubscriptionRow>> {
        self.check()?;
        Ok(self.rows())
    }

    async fn save(&self, sub: SaveSubscription) -> DbResult<SubscriptionRow> {
        self.check()?;
        self.write(sub)
    }

    // writes land in order; the API tests never need a mid-batch rollback
    async fn save_all(&self, subs: Vec<SaveSubscription>) -> DbResult<Vec<SubscriptionRow>> {
        self.check()?;
        subs.into_iter().map(|sub| self.write(sub)).collect()
    }
}

/// Router wired to an in-memory store and a clock pinned to `today`
pub struct TestApp {
    pub router: Router,
    pub store: InMemorySubscriptions,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub fn new(today: NaiveDate) -> Self {
        let store = InMemorySubscriptions::default();
        let clock = Arc::new(FixedClock::new(today));

        let repo: Arc<dyn SubscriptionRepository> = Arc::new(store.clone());
        let service_clock: Arc<dyn Clock> = clock.clone();
        let service = SubscriptionService::new(repo, service_clock);

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/cadence_test".to_string()),
            _ => None,
        })
        .unwrap();

        // never connected; only /ready touches it
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy(&config.database_url)
            .unwrap();

        let state = AppState::new(service, pool, config);
        Self {
            router: build_router(state, None),
            store,
            clock,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (axum::http::StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.send(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
