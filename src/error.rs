use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Not a video reference: {0}")]
    InvalidVideoReference(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Transcript unavailable: {0}")]
    TranscriptUnavailable(String),

    #[error("Transcript provider error: {0}")]
    TranscriptProvider(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            ApiError::InvalidVideoReference(ref msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            ApiError::QuotaExceeded(ref msg) => {
                (StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED", msg.clone())
            }
            ApiError::TranscriptUnavailable(ref msg) => {
                (StatusCode::NOT_FOUND, "NO_TRANSCRIPT", msg.clone())
            }
            ApiError::TranscriptProvider(ref msg) => {
                tracing::error!("Transcript provider error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "TRANSCRIPT_PROVIDER_ERROR",
                    "Transcript service temporarily unavailable".to_string(),
                )
            }
            ApiError::AiProvider(ref msg) => {
                tracing::error!("AI provider error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_PROVIDER_ERROR",
                    "AI service temporarily unavailable".to_string(),
                )
            }
            ApiError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            ApiError::Conflict(ref msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                "Too many requests, please try again later".to_string(),
            ),
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn client_conditions_map_to_4xx() {
        assert_eq!(
            status_of(ApiError::InvalidVideoReference("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::QuotaExceeded("none left".into())),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(ApiError::TranscriptUnavailable("no captions".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn upstream_failures_map_to_502() {
        assert_eq!(
            status_of(ApiError::TranscriptProvider("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::AiProvider("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn internal_failures_map_to_500() {
        assert_eq!(
            status_of(ApiError::Internal(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
