//! Core Twitter API utilities.
//!
//! This module contains the low-level helpers shared by the tweet operations:
//! log sanitizing and classification of posting API responses.

use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;

/// Fallback detail used when a failure response carries no readable reason.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Body of a successful `POST /2/tweets` response.
#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    #[serde(default)]
    data: Option<CreatedTweet>,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// This function:
/// - Truncates long text to prevent log flooding
/// - Replaces control characters that could manipulate log output
/// - Escapes newlines to prevent log injection
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_chars`: Maximum number of characters kept before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub(crate) fn sanitize_for_logging(text: &str, max_chars: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_chars {
        let kept: String = sanitized.chars().take(max_chars).collect();
        format!("{}... [truncated, {} total bytes]", kept, text.len())
    } else {
        sanitized
    }
}

/// Pulls a human-readable reason out of a failure body.
///
/// Looks at `detail`, `title`, `message` and `errors[0].message` in that
/// order and returns the first non-empty string. Bodies that are not JSON, or
/// carry none of these fields, yield [`UNKNOWN_ERROR`].
pub(crate) fn extract_error_message(body: &[u8]) -> String {
    let Ok(json) = serde_json::from_slice::<Value>(body) else {
        return UNKNOWN_ERROR.to_string();
    };

    let candidates = [
        json.get("detail"),
        json.get("title"),
        json.get("message"),
        json.get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|first| first.get("message")),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
    message
}

/// Classifies a posting API response.
///
/// A success status alone is not trusted: the body must carry a non-empty
/// string at `data.id`.
///
/// # Returns
///
/// - `Ok(String)`: The identifier of the created post
/// - `Err(AppError::UpstreamProtocol)`: 2xx without a usable identifier
/// - `Err(AppError::UpstreamRejection)`: Any non-2xx status
pub(crate) fn interpret_post_response(status: u16, body: &[u8]) -> Result<String, AppError> {
    if (200..300).contains(&status) {
        let envelope: CreateTweetResponse = serde_json::from_slice(body).map_err(|e| {
            error!(
                "Posting API returned {} with an unreadable body: {}",
                status, e
            );
            AppError::UpstreamProtocol(format!("unexpected response body: {}", e))
        })?;

        return match envelope.data.map(|data| data.id) {
            Some(id) if !id.is_empty() => {
                debug!("Posting API returned id {}", id);
                Ok(id)
            }
            _ => {
                error!(
                    "Posting API returned {} without data.id: {}",
                    status,
                    sanitize_for_logging(&String::from_utf8_lossy(body), 200)
                );
                Err(AppError::UpstreamProtocol(
                    "response has no data.id".to_string(),
                ))
            }
        };
    }

    let message = extract_error_message(body);
    warn!("Posting API rejected the request - Status: {}", status);
    debug!(
        "Error response: {}",
        sanitize_for_logging(&String::from_utf8_lossy(body), 200)
    );
    Err(AppError::UpstreamRejection { status, message })
}
