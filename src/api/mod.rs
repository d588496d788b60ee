//! HTTP surface: the axum router and the error type every handler returns.

pub mod rest;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::resolver::ResolveError;

pub use rest::router;

/// Handler error. Serialised as `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Resolve(ResolveError::EmptySymbol) => StatusCode::BAD_REQUEST,
            ApiError::Resolve(ResolveError::UnexpectedCacheEntry { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
