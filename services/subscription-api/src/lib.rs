//! Cadence Subscription API
//!
//! REST surface over the subscription lifecycle service.
//!
//! ## REST Endpoints
//!
//! - `POST /subscriptions` - Start a subscription
//! - `PUT /change-plan` - Replace the current subscription with another plan
//! - `PUT /cancel/{userId}` - Stop renewal
//! - `GET /subscriptions/user/{userId}` - Get the current subscription
//! - `GET /subscriptions/user/{userId}/access` - Access check
//! - `GET /all-subscriptions` - List every stored subscription
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{health, ready};

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use state::AppState;

/// Build the HTTP router with middleware
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let subscription_routes = Router::new()
        .route("/subscriptions", post(handlers::create_subscription))
        .route("/change-plan", put(handlers::change_plan))
        .route("/cancel/{user_id}", put(handlers::cancel_subscription))
        .route("/subscriptions/user/{user_id}", get(handlers::get_subscription))
        .route("/subscriptions/user/{user_id}/access", get(handlers::get_access))
        .route("/all-subscriptions", get(handlers::get_all_subscriptions));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Outermost first
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(subscription_routes)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
