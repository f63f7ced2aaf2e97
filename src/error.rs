use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API clients. Every variant renders as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Body could not be read by an extractor (malformed, too large, ...).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}: {source:#}")]
    Store {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("storing upload failed: {source:#}")]
    Upload {
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn store(message: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ApiError::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { .. } | ApiError::Upload { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Validation(m) => m.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::NotFound(m) => (*m).to_string(),
            ApiError::Store { message, source } => {
                error!(error = %source, "{message}");
                (*message).to_string()
            }
            ApiError::Upload { source } => {
                error!(error = %source, "upload failed");
                "Error saving profile picture.".to_string()
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
