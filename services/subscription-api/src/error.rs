//! Error types for the Subscription API service.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cadence_lifecycle::LifecycleError;
use cadence_types::SubscriptionError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Subscription(#[from] SubscriptionError),

    /// Request could not be parsed
    #[error("{0}")]
    BadRequest(String),

    #[error("Database error")]
    Database(#[source] cadence_db::DbError),
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Subscription(e) => Self::Subscription(e),
            LifecycleError::Database(e) => Self::Database(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Subscription(SubscriptionError::DoesNotExist) => StatusCode::NOT_FOUND,
            Self::Subscription(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Subscription(e) => e.kind(),
            Self::BadRequest(_) => "InvalidSubscription",
            Self::Database(_) => "Exception",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors
        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal API error");
        }

        let body = ErrorResponse {
            kind: self.kind().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_domain_errors_are_client_errors() {
        let (status, body) = render(SubscriptionError::invalid("The plan is mandatory").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "InvalidSubscription");
        assert_eq!(body["message"], "The plan is mandatory");

        let (status, body) = render(SubscriptionError::CannotBeCanceled.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "SubscriptionCannotBeCanceled");

        let (status, body) = render(SubscriptionError::CannotBeRenewed.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "SubscriptionCannotBeRenewed");
    }

    #[tokio::test]
    async fn test_missing_subscription_is_not_found() {
        let (status, body) = render(SubscriptionError::DoesNotExist.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "SubscriptionDoesNotExist");
        assert_eq!(body["message"], "The subscription was not found");
    }

    #[tokio::test]
    async fn test_unclassified_faults_are_server_errors() {
        let err = ApiError::from(LifecycleError::Database(cadence_db::DbError::NotFound));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "Exception");
        assert_eq!(body["message"], "Database error");
    }
}
