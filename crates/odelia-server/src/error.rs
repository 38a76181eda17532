//! Error types for the HTTP layer

use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use odelia_engine::{Envelope, ValidationError};

use crate::records::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors a handler can return. Each maps to a `{success: false, message}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("malformed request body: {0}")]
    BadBody(#[from] JsonRejection),

    #[error("response store unavailable")]
    StoreUnavailable,

    #[error("response store failed: {0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Invalid(_) | ServerError::BadBody(_) => StatusCode::BAD_REQUEST,
            ServerError::StoreUnavailable | ServerError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Internal causes stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Invalid(e) => e.to_string(),
            ServerError::BadBody(_) => "Invalid request body.".to_string(),
            ServerError::StoreUnavailable | ServerError::Store(_) => {
                "Failed to fetch statistics".to_string()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(Envelope::fail(self.public_message()))).into_response()
    }
}
