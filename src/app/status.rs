//! Errors paired with the HTTP status a usecase chose for them.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::AppError;

/// A usecase failure together with the status code callers must answer with
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{source}")]
pub struct StatusError {
    pub status: StatusCode,
    #[source]
    pub source: AppError,
}

impl StatusError {
    #[must_use]
    pub fn new(status: StatusCode, source: AppError) -> Self {
        Self { status, source }
    }
}

/// Result of a usecase that reports its own status; success is always `200 OK`
pub type StatusResult<T> = Result<(T, StatusCode), StatusError>;
