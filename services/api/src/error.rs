//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use revision_core::RevisionError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the revision core.
    #[error("Revision error: {0}")]
    Revision(#[from] RevisionError),

    /// The requested revision is not in the history.
    #[error("Revision not found: {0}")]
    NotFound(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body returned for every failed request.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Revision(RevisionError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Revision(RevisionError::Generation(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Revision(RevisionError::DuplicateRevision(_)) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revision_core::{ports::PortError, RevisionId};

    #[test]
    fn port_failures_map_by_where_they_happened() {
        let generation = ApiError::from(RevisionError::Generation(PortError::Upstream(
            "rate limited".to_string(),
        )));
        assert_eq!(generation.status(), StatusCode::BAD_GATEWAY);

        let persistence = ApiError::from(RevisionError::Persistence(PortError::Unexpected(
            "disk full".to_string(),
        )));
        assert_eq!(persistence.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(persistence.to_string().contains("disk full"));
    }

    #[test]
    fn client_errors_keep_their_status() {
        let validation = ApiError::from(RevisionError::Validation("empty text".to_string()));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        let duplicate = ApiError::from(RevisionError::DuplicateRevision(RevisionId::new()));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
