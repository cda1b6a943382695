use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure the service can surface. Each variant maps to exactly one
/// HTTP status code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input. Carries one message per failed check.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("invalid token")]
    InvalidToken,

    #[error("invalid username or password")]
    InvalidCredentials,

    /// Missing identity, wrong role, or wrong owner.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Username or category name collision.
    #[error("{0}")]
    Conflict(String),

    /// Persistence or configuration failure. The detail is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidToken | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn errors(&self) -> Value {
        match self {
            Self::Validation(msgs) => json!(msgs),
            Self::Internal(_) => json!("internal server error"),
            other => json!(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal(detail) = &self {
            error!(error = %detail, "request failed");
        }
        let body = ApiResponse::new(status, "error", json!({ "errors": self.errors() }));
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return Self::Conflict("duplicate entry".into());
            }
            if db.is_foreign_key_violation() {
                return Self::Conflict("record is referenced by other records".into());
            }
        }
        Self::Internal(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(format!("{e:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn each_kind_has_one_status() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound(String::new()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict(String::new()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Internal(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_display_joins_messages() {
        let err = AppError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation failed: a; b");
    }

    #[tokio::test]
    async fn envelope_carries_code_status_and_messages() {
        let res = AppError::Validation(vec!["amount must be greater than 0".into()]).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 422);
        assert_eq!(body["status"], "Unprocessable Entity");
        assert_eq!(body["message"], "error");
        assert_eq!(body["data"]["errors"][0], "amount must be greater than 0");
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let res = AppError::Internal("connection refused on 10.0.0.3".into()).into_response();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["errors"], "internal server error");
    }
}
