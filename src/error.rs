//! Error taxonomy for the postcraft service.
//!
//! Every handler returns `Result<_, AppError>`. Errors are converted into the
//! JSON error envelope at the HTTP boundary, so nothing propagates to axum as
//! an unhandled fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

/// Errors produced while generating or posting social media content.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request body or one of its fields was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// A required secret is not configured. The payload names the missing
    /// variable for the server log only; it is never sent to the client.
    #[error("missing configuration: {0}")]
    Configuration(&'static str),

    /// The posting API answered with a non-2xx status.
    #[error("Twitter API rejected the request ({status}): {message}")]
    UpstreamRejection { status: u16, message: String },

    /// The posting API answered 2xx but the body did not have the success shape.
    #[error("unexpected response from Twitter: {0}")]
    UpstreamProtocol(String),

    /// The outbound request could not be completed (network, timeout, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// The chat-completion API failed or returned an unusable body.
    #[error("OpenAI API error: {0}")]
    Generation(String),

    /// A local failure such as HMAC key setup or a clock before the Unix epoch.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl AppError {
    /// HTTP status used for this error in the response envelope.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The client-facing `error` text. Configuration and transport details stay in the log.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::Configuration(_) => "Server error: service is not configured".to_string(),
            AppError::UpstreamRejection { message, .. } => {
                format!("Twitter posting failed: {}", message)
            }
            AppError::UpstreamProtocol(_) => {
                "Twitter posting failed: unexpected response from Twitter".to_string()
            }
            AppError::Transport(_) => "Server error: upstream request failed".to_string(),
            AppError::Generation(message) => format!("OpenAI API error: {}", message),
            AppError::Internal(_) => "Server error: internal failure".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(message) => warn!("Rejected request: {}", message),
            other => error!("Request failed: {}", other),
        }

        let mut body = json!({
            "success": false,
            "error": self.client_message(),
        });
        if let AppError::UpstreamRejection { status, .. } = &self {
            body["status_code"] = json!(status);
        }

        (self.status_code(), Json(body)).into_response()
    }
}
