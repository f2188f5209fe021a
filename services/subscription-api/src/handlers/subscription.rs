//! Subscription handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use cadence_types::{Plan, Subscription, SubscriptionError, UserId};

use super::shared::{parse_user_id, record_op_duration};
use crate::error::ApiResult;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub user_id: Option<i64>,
    pub plan: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub user_id: Option<i64>,
    pub new_plan: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription_id: Option<i64>,
    pub status: String,
    pub plan: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            subscription_id: sub.id().map(|id| id.0),
            status: sub.status().to_string(),
            plan: sub.plan().to_string(),
            start_date: sub.start_date(),
            end_date: sub.end_date(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancellationResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub user_id: i64,
    pub has_access: bool,
}

fn require_user_id(user_id: Option<i64>) -> Result<UserId, SubscriptionError> {
    match user_id {
        None => Err(SubscriptionError::invalid("User ID is required")),
        Some(id) if id > 0 => Ok(UserId(id)),
        Some(id) => Err(SubscriptionError::invalid(format!("Invalid user ID: {id}"))),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let start = Instant::now();
    let Json(req) = payload?;

    let user_id = require_user_id(req.user_id)?;
    let plan = Plan::from_input(req.plan.as_deref())?;

    let result = state.subscriptions.create_subscription(user_id, plan).await;
    record_op_duration("create_subscription", start, result.is_ok());
    let sub = result?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(&sub))))
}

/// PUT /change-plan
pub async fn change_plan(
    State(state): State<AppState>,
    payload: Result<Json<ChangePlanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let start = Instant::now();
    let Json(req) = payload?;

    let user_id = require_user_id(req.user_id)?;
    let new_plan = Plan::from_input(req.new_plan.as_deref())?;

    let result = state.subscriptions.change_plan(user_id, new_plan).await;
    record_op_duration("change_plan", start, result.is_ok());
    let sub = result?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(&sub))))
}

/// PUT /cancel/{user_id}
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> ApiResult<Json<CancellationResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&raw_user_id)?;

    let result = state.subscriptions.cancel_subscription(user_id).await;
    record_op_duration("cancel_subscription", start, result.is_ok());
    let summary = result?;

    Ok(Json(CancellationResponse {
        status: summary.status.to_string(),
        message: summary.message.to_string(),
    }))
}

/// GET /subscriptions/user/{user_id}
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&raw_user_id)?;

    let result = state.subscriptions.get_subscription(user_id).await;
    record_op_duration("get_subscription", start, result.is_ok());
    let sub = result?;

    Ok(Json(SubscriptionResponse::from(&sub)))
}

/// GET /subscriptions/user/{user_id}/access
pub async fn get_access(
    State(state): State<AppState>,
    Path(raw_user_id): Path<String>,
) -> ApiResult<Json<AccessResponse>> {
    let start = Instant::now();
    let user_id = parse_user_id(&raw_user_id)?;

    let result = state.subscriptions.has_access(user_id).await;
    record_op_duration("has_access", start, result.is_ok());

    Ok(Json(AccessResponse {
        user_id: user_id.0,
        has_access: result?,
    }))
}

/// GET /all-subscriptions
pub async fn get_all_subscriptions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SubscriptionResponse>>> {
    let start = Instant::now();

    let result = state.subscriptions.get_all_subscriptions().await;
    record_op_duration("get_all_subscriptions", start, result.is_ok());
    let subs = result?;

    Ok(Json(subs.iter().map(SubscriptionResponse::from).collect()))
}
