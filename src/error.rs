//! Unified error types for the proxy.
//!
//! Every variant maps to one HTTP status and is rendered as
//! `{"detail": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::utils::truncate_chars;

/// Maximum characters of upstream or internal error text echoed to clients.
pub const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// JSON error envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub detail: String,
}

/// Error type returned by the proxy routes.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The upstream API key is not configured on the server.
    #[error("Server is missing WANDB_API_KEY env var")]
    MissingApiKey,

    /// Upstream answered with an HTTP error status.
    #[error("W&B API error: {body}")]
    Upstream {
        /// Status returned by the upstream, passed through to the client.
        status: StatusCode,
        /// Response body, already truncated.
        body: String,
    },

    /// Upstream answered 200 but reported GraphQL errors.
    #[error("W&B GraphQL error: {0}")]
    GraphQl(String),

    /// Project missing from the upstream payload.
    #[error("Project not found or access denied")]
    ProjectNotFound,

    /// Run (or its project) missing from the upstream payload.
    #[error("Run not found")]
    RunNotFound,

    /// Request parameters failed validation.
    #[error("{0}")]
    Validation(String),

    /// Network, decoding, or any other unexpected failure.
    #[error("Server error contacting W&B: {0}")]
    Internal(String),
}

impl ApiError {
    /// Build an upstream error, truncating the body.
    pub fn upstream(status: StatusCode, body: &str) -> Self {
        ApiError::Upstream {
            status,
            body: truncate_chars(body, MAX_ERROR_DETAIL_CHARS),
        }
    }

    /// Build an internal error from any displayable failure, truncating its text.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(truncate_chars(&err.to_string(), MAX_ERROR_DETAIL_CHARS))
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey | ApiError::GraphQl(_) | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Upstream { status, .. } => *status,
            ApiError::ProjectNotFound | ApiError::RunNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingApiKey => "missing_api_key",
            ApiError::Upstream { .. } => "upstream",
            ApiError::GraphQl(_) => "graphql",
            ApiError::ProjectNotFound | ApiError::RunNotFound => "not_found",
            ApiError::Validation(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::internal(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ApiError>;
