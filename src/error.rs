//! Error types for the agent
//!
//! Every error maps to the agent's HTTP contract: client mistakes become
//! 400 responses with a structured body, execution problems become a fixed
//! 500 advisory that never carries command output over the wire.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::fault::ValidationErrors;

/// Body returned when the request body cannot be parsed as JSON
pub const INVALID_JSON_MESSAGE: &str = "Not valid JSON";

/// Body returned when a shell command needed to install a fault fails
pub const SHELL_FAILURE_MESSAGE: &str =
    "Failed to execute a shell command on the server. See the /var/log/saboteur/agent-error.log for details.";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("request body is not valid JSON")]
    InvalidJson,

    #[error("unknown fault type: {0}")]
    UnknownFaultType(String),

    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("command `{command}` exited with status {exit_code}: {stderr}")]
    ShellFailure {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn internal(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidJson | AppError::UnknownFaultType(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ShellFailure { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::InvalidJson => json!(INVALID_JSON_MESSAGE),
            AppError::UnknownFaultType(message) => json!({ "errors": { "type": message } }),
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::ShellFailure { .. } | AppError::Internal(_) => {
                error!("Request failed: {}", self);
                json!(SHELL_FAILURE_MESSAGE)
            }
        };
        (status, Json(body)).into_response()
    }
}
