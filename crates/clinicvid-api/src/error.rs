//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinicvid_bundler::BundlerError;
use clinicvid_models::NamespaceError;
use clinicvid_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

use crate::config;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Bundler error: {0}")]
    Bundler(#[from] BundlerError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(StorageError::NotFound(_))
            | ApiError::Bundler(BundlerError::Storage(StorageError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(_) | ApiError::Bundler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NamespaceError> for ApiError {
    fn from(e: NamespaceError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl ApiError {
    /// Detail shown to clients. Server errors are masked in production.
    fn public_detail(&self, production: bool) -> String {
        if production && self.status_code().is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.public_detail(config::production_from_env());

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
