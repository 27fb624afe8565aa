//! HTTP route handlers for the postcraft service.
//!
//! This module contains all the HTTP route handler functions that process
//! incoming requests and return appropriate responses. Handlers share an
//! [`AppState`] holding the read-only configuration and the HTTP client.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use log::{error, info};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::openai::{generate_post, PostRequest};
use crate::twitter::{extract_post_text, post_tweet};

/// Name of the form page served at `/`.
pub const FORM_FILE: &str = "social-form.html";

/// State shared by every handler.
///
/// The configuration is read-only after start-up; `reqwest::Client` pools
/// connections internally and is cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Builds the state, applying the configured timeout to the HTTP client.
    ///
    /// # Returns
    ///
    /// - `Ok(AppState)`: Ready to be handed to the router
    /// - `Err(AppError::Internal)`: If the HTTP client cannot be built
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(AppState {
            config: Arc::new(config),
            http,
        })
    }
}

/// Handles GET requests to the `/health` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "message": "Backend is running",
///   "version": "1.0.0"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Backend is running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handles GET requests to `/` and `/social-form.html`.
///
/// Serves the form page from the configured static directory, or a JSON 404
/// if the file does not exist.
pub async fn handle_form(State(state): State<AppState>) -> Response {
    let path = state.config.static_dir.join(FORM_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": format!("{} not found", FORM_FILE)})),
            )
                .into_response()
        }
    }
}

/// Handles POST requests to the `/generate` endpoint.
///
/// Validates the form attributes and returns a generated draft.
///
/// # Success Response
///
/// ```json
/// {
///   "success": true,
///   "prompt": "Generate a friendly social media post for ...",
///   "post": "<generated text>"
/// }
/// ```
///
/// # Error Response
///
/// ```json
/// {
///   "success": false,
///   "error": "Missing required fields: age, tone"
/// }
/// ```
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    info!("Received generate request");
    let request = PostRequest::from_body(&body)?;
    let generated = generate_post(&state.http, &state.config.openai, &request).await?;

    Ok(Json(json!({
        "success": true,
        "prompt": generated.prompt,
        "post": generated.post,
    })))
}

/// Handles POST requests to the `/post-to-twitter` endpoint.
///
/// Takes `{"post": "<text>"}`, clips the text to 280 characters and
/// publishes it with an OAuth 1.0a signed request.
///
/// # Success Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Post successfully shared on Twitter!",
///   "tweet_id": "123",
///   "tweet_url": "https://twitter.com/user/status/123"
/// }
/// ```
///
/// # Error Response
///
/// ```json
/// {
///   "success": false,
///   "error": "Twitter posting failed: Forbidden",
///   "status_code": 403
/// }
/// ```
pub async fn handle_post_to_twitter(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    info!("Received Twitter posting request");
    let text = extract_post_text(&body)?;
    let tweet = post_tweet(&state.http, &state.config.twitter, &text).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Post successfully shared on Twitter!",
        "tweet_id": tweet.id,
        "tweet_url": tweet.url,
    })))
}
