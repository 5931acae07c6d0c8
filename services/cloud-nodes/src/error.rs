//! Request-level errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that fail a Node Lookup request
#[derive(Debug, Error)]
pub enum NodesError {
    /// Required query parameter absent or empty
    #[error("{0} is a required parameter")]
    MissingParameter(&'static str),

    /// Query parameter present but unusable
    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// No provider registered for the requested cloud
    #[error("Cloud provider not supported: {0}")]
    ProviderNotSupported(String),

    /// Provider construction, init, or query failed
    #[error(transparent)]
    Provider(ProviderError),
}

impl NodesError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NodesError::MissingParameter(_)
            | NodesError::InvalidParameter { .. }
            | NodesError::ProviderNotSupported(_) => StatusCode::BAD_REQUEST,
            NodesError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable identifier for the `error` field of the response body
    pub fn code(&self) -> &'static str {
        match self {
            NodesError::MissingParameter(_) => "missing_parameter",
            NodesError::InvalidParameter { .. } => "invalid_parameter",
            NodesError::ProviderNotSupported(_) => "provider_not_supported",
            NodesError::Provider(_) => "provider_error",
        }
    }
}

impl From<ProviderError> for NodesError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotSupported(cloud) => NodesError::ProviderNotSupported(cloud),
            other => NodesError::Provider(other),
        }
    }
}

impl IntoResponse for NodesError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(serde_json::json!({
                "error": self.code(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
