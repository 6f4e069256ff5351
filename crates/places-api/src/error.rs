//! Error types for the HTTP API layer.
//!
//! [`ApiError`] unifies every handler failure into a single enum that is
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//!
//! Store faults of every kind, not-found included, are reported as
//! `500` with the fault's message, and so are bodies that break the
//! place schema. Clients cannot tell a missing record
//! from an internal error by status code alone.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use places_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The data layer failed (missing record, schema violation, or
    /// storage fault).
    #[error("{0}")]
    Store(#[from] DbError),

    /// A request body is not JSON or does not fit the place schema
    /// (unknown category, missing or mistyped field).
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    /// A place id in the request path is not a UUID.
    #[error("invalid place id: {0}")]
    InvalidId(String),

    /// A real-time upgrade came from an origin other than the allowed one.
    #[error("origin not allowed: {0}")]
    OriginNotAllowed(String),
}

impl ApiError {
    /// The HTTP status this error is reported with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Body(_) | Self::InvalidId(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
