use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrors;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any of the above, carrying structured details for the response body
    #[error("{error}")]
    WithDetails { error: Box<AppError>, details: Value },
}

impl AppError {
    /// Attach structured details (replaces any existing details)
    pub fn with_details(self, details: Value) -> Self {
        match self {
            AppError::WithDetails { error, .. } => AppError::WithDetails { error, details },
            other => AppError::WithDetails {
                error: Box::new(other),
                details,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::WithDetails { error, .. } => error.status_code(),
        }
    }

    /// Machine-readable error code included in the response body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::WithDetails { error, .. } => error.code(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        AppError::Validation(errors.to_string()).with_details(details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        let (error, details) = match self {
            AppError::WithDetails { error, details } => (*error, Some(details)),
            other => (other, None),
        };

        let (message, errors) = match error {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error occurred".to_string(), None)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(ref msg) => (msg.clone(), Some(vec![msg.clone()])),
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => (msg, None),
            AppError::WithDetails { error, .. } => (error.to_string(), None),
        };

        let body = Json(ApiResponse::<()>::error(code, Some(message), errors, details));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_with_details_keeps_inner_status_and_code() {
        let err = AppError::NotFound("Incident not found".into())
            .with_details(json!({ "incident_id": "abc" }));

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Not found: Incident not found");
    }

    #[test]
    fn test_with_details_replaces_previous_details() {
        let err = AppError::Forbidden("nope".into())
            .with_details(json!({ "a": 1 }))
            .with_details(json!({ "b": 2 }));

        match err {
            AppError::WithDetails { error, details } => {
                assert!(matches!(*error, AppError::Forbidden(_)));
                assert_eq!(details, json!({ "b": 2 }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_into_response_serializes_error_envelope() {
        let response = AppError::BadRequest("Parent comment is invalid".into())
            .with_details(json!({ "parent_id": "p1" }))
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("BAD_REQUEST"));
        assert_eq!(body["message"], json!("Parent comment is invalid"));
        assert_eq!(body["details"], json!({ "parent_id": "p1" }));
    }

    #[tokio::test]
    async fn test_database_errors_are_not_leaked() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], json!("Database error occurred"));
        assert_eq!(body["code"], json!("INTERNAL_ERROR"));
    }
}
