use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{auth::TokenError, password::PasswordError, repository::RepoError};

/// FieldError
///
/// A single validation failure, reported back to the client next to the
/// offending field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// ErrorBody
///
/// The JSON envelope every failed request answers with.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    /// Underlying failure, only present outside production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// AppError
///
/// Request-boundary error taxonomy. Every handler and middleware returns this
/// type so the mapping to an HTTP status and the `{ error }` body lives in one place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal Server Error")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

static EXPOSE_INTERNAL_DETAIL: AtomicBool = AtomicBool::new(false);

/// Whether 500 bodies carry the underlying failure. Off until the router is
/// built, which turns it on for local environments.
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAIL.store(enabled, Ordering::Relaxed);
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("Insufficient permissions".to_string())
    }

    fn body(&self) -> ErrorBody {
        match self {
            AppError::Validation(errors) => ErrorBody {
                error: self.to_string(),
                errors: errors.clone(),
                detail: None,
            },
            AppError::Internal(detail) => ErrorBody {
                error: self.to_string(),
                errors: Vec::new(),
                detail: EXPOSE_INTERNAL_DETAIL
                    .load(Ordering::Relaxed)
                    .then(|| detail.clone()),
            },
            _ => ErrorBody {
                error: self.to_string(),
                errors: Vec::new(),
                detail: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(detail) => tracing::error!(%status, detail = %detail, "request failed"),
            other => tracing::debug!(%status, error = %other, "request rejected"),
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation(_) => {
                AppError::BadRequest("Resource already exists".to_string())
            }
            RepoError::ForeignKeyViolation(_) => {
                AppError::BadRequest("Referenced resource does not exist".to_string())
            }
            RepoError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid => AppError::Unauthorized("Invalid token".to_string()),
            TokenError::Signing(e) => AppError::Internal(e),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}
