//! # Postcraft Library
//!
//! A Rust web service library that generates social media posts with the OpenAI
//! chat-completion API and publishes them to Twitter/X. Posting requests are
//! signed with OAuth 1.0a (HMAC-SHA1, one-legged, pre-provisioned access token).
//!
//! ## Features
//!
//! - HTTP server with form, generation, posting and health endpoints
//! - OAuth 1.0a request signing built from HMAC-SHA1, base64 and RFC 3986 encoding
//! - Strict classification of Twitter responses (a 2xx without a post id is an error)
//! - Structured logging
//!
//! ## Configuration
//!
//! See [`AppConfig::from_env`] for the environment variables that are read.
//! `PORT` sets the listen port (defaults to 5000).
//!
//! ## API Endpoints
//!
//! - `GET /`, `GET /social-form.html`: Serves the form page
//! - `POST /generate`: Generates a draft post from form attributes
//! - `POST /post-to-twitter`: Publishes a post to Twitter/X
//! - `GET /health`: Returns service health status

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod openai;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{get_server_port, AppConfig, OpenAiConfig, TwitterConfig};
pub use error::AppError;
pub use handlers::{
    handle_form, handle_generate, handle_health, handle_post_to_twitter, AppState,
};
pub use oauth::{build_bearer_auth_header, OAuthCredentials, OAuthSigner};
pub use openai::{generate_post, GeneratedPost, PostRequest};
pub use twitter::{enforce_length, post_tweet, PostedTweet};

/// Cross-origin policy: any origin, the methods the routes accept, and
/// `Content-Type` as the only request header. Preflight `OPTIONS` requests
/// are answered by this layer with an empty 200.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Builds the application router with all routes and middleware.
///
/// # Example
///
/// ```rust,no_run
/// use postcraft::{build_app, AppConfig, AppState};
///
/// #[tokio::main]
/// async fn main() {
///     let state = AppState::new(AppConfig::from_env()).unwrap();
///     let app = build_app(state);
///     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
///     axum::serve(listener, app).await.unwrap();
/// }
/// ```
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_form))
        .route("/social-form.html", get(handle_form))
        .route("/generate", post(handle_generate))
        .route("/post-to-twitter", post(handle_post_to_twitter))
        .route("/health", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}
