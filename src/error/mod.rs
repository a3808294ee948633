// Error types for the rategate service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Invalid rate policy for '{endpoint}': {reason}")]
    InvalidPolicy { endpoint: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert GateError to HTTP responses for Axum
impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            GateError::Config(_) | GateError::ConfigParsing(_) | GateError::InvalidPolicy { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", self.to_string())
            }
            GateError::Json(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", self.to_string())
            }
            _ => {
                (StatusCode::INTERNAL_SERVER_ERROR, "api_error", self.to_string())
            }
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
