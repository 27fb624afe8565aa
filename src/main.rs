//! # Postcraft
//!
//! A Rust web service that generates social media posts with the OpenAI API and
//! publishes them to Twitter/X using OAuth 1.0a signed requests.
//!
//! ## Environment Variables
//!
//! - `xapi_consumer_key`, `xapi_consumer_secret`, `xapi_access_token`,
//!   `xapi_access_token_secret`: Twitter/X OAuth 1.0a credentials
//! - `openai_api_key`: OpenAI API key
//! - `PORT`: Server port (defaults to 5000)
//! - `RUST_LOG`: Log filter, e.g. `info` or `postcraft=debug`
//!
//! ## API Endpoints
//!
//! - `GET /`: Serves the post form
//! - `POST /generate`: Generates a post draft
//! - `POST /post-to-twitter`: Publishes a post to Twitter/X
//! - `GET /health`: Returns service health status

use log::{error, info};
use std::net::SocketAddr;

use postcraft::{build_app, get_server_port, AppConfig, AppState};

/// Main entry point for the postcraft web service.
///
/// Initializes logging, loads the configuration, and serves HTTP requests
/// until Ctrl+C is received.
///
/// # Example Usage
///
/// ```bash
/// # Run with default port 5000
/// cargo run
///
/// # Run on custom port with debug logging
/// PORT=8080 RUST_LOG=debug cargo run
/// ```
#[tokio::main]
async fn main() {
    // Initialize the logging system
    env_logger::init();

    let state = match AppState::new(AppConfig::from_env()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    let app = build_app(state);

    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Starting postcraft server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server error: {}", e);
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Keep serving; without a signal handler there is nothing to wait for.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
