//! Configuration module for the postcraft service.
//!
//! This module contains configuration structures and environment variable handling
//! for the Twitter/X and OpenAI API integrations. Configuration is loaded once at
//! start-up and handed to the handlers through axum state; nothing here is global.

use log::{info, warn};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::oauth::OAuthCredentials;

/// Default Twitter/X API base URL.
pub const DEFAULT_TWITTER_API_URL: &str = "https://api.x.com";
/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com";
/// Default chat model used for post generation.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
/// Default outbound request deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default listen port.
pub const DEFAULT_PORT: u16 = 5000;

/// Twitter/X API settings.
///
/// The four OAuth 1.0a secrets are kept as loaded; they are validated per
/// request by [`TwitterConfig::credentials`] so that a missing secret fails
/// the request before anything is signed or sent.
#[derive(Clone, Default)]
pub struct TwitterConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    /// Base URL of the posting API, without a trailing slash.
    pub api_url: String,
}

impl std::fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("consumer_key", &self.consumer_key.as_ref().map(|_| "[REDACTED]"))
            .field("consumer_secret", &self.consumer_secret.as_ref().map(|_| "[REDACTED]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "access_token_secret",
                &self.access_token_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl TwitterConfig {
    /// Returns validated OAuth credentials.
    ///
    /// # Returns
    ///
    /// - `Ok(OAuthCredentials)`: If all four secrets are present and non-blank
    /// - `Err(AppError::Configuration)`: If any secret is missing
    pub fn credentials(&self) -> Result<OAuthCredentials, AppError> {
        OAuthCredentials::new(
            self.consumer_key.as_deref().unwrap_or(""),
            self.consumer_secret.as_deref().unwrap_or(""),
            self.access_token.as_deref().unwrap_or(""),
            self.access_token_secret.as_deref().unwrap_or(""),
        )
    }

    /// The fixed endpoint that new posts are sent to.
    pub fn tweets_endpoint(&self) -> String {
        format!("{}/2/tweets", self.api_url)
    }
}

/// OpenAI chat-completion settings.
#[derive(Clone, Default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    /// Base URL of the OpenAI API, without a trailing slash.
    pub api_url: String,
    pub model: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiConfig {
    /// Returns the API key or a configuration error.
    pub fn api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AppError::Configuration("openai_api_key"))
    }

    /// The chat-completion endpoint.
    pub fn completions_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.api_url)
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub twitter: TwitterConfig,
    pub openai: OpenAiConfig,
    /// Directory that holds `social-form.html`.
    pub static_dir: PathBuf,
    /// Deadline applied to every outbound request.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `xapi_consumer_key`, `xapi_consumer_secret`, `xapi_access_token`,
    ///   `xapi_access_token_secret`: OAuth 1.0a credentials for posting
    /// - `xapi_api_url`: Posting API base URL (defaults to `https://api.x.com`)
    /// - `openai_api_key`: OpenAI API key for post generation
    /// - `openai_api_url`: OpenAI base URL (defaults to `https://api.openai.com`)
    /// - `openai_model`: Chat model (defaults to `gpt-4`)
    /// - `STATIC_DIR`: Directory containing `social-form.html` (defaults to `.`)
    /// - `REQUEST_TIMEOUT_SECS`: Outbound request deadline (defaults to 30)
    ///
    /// Missing secrets are logged by name and left unset; requests that need
    /// them fail with a configuration error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use postcraft::AppConfig;
    ///
    /// let config = AppConfig::from_env();
    /// assert!(!config.twitter.api_url.ends_with('/'));
    /// ```
    pub fn from_env() -> Self {
        info!("Loading configuration from environment variables");

        let twitter = TwitterConfig {
            consumer_key: load_secret("xapi_consumer_key"),
            consumer_secret: load_secret("xapi_consumer_secret"),
            access_token: load_secret("xapi_access_token"),
            access_token_secret: load_secret("xapi_access_token_secret"),
            api_url: load_url("xapi_api_url", DEFAULT_TWITTER_API_URL),
        };

        let openai = OpenAiConfig {
            api_key: load_secret("openai_api_key"),
            api_url: load_url("openai_api_url", DEFAULT_OPENAI_API_URL),
            model: load_optional("openai_model").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        };

        let static_dir = load_optional("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let request_timeout = match load_optional("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "REQUEST_TIMEOUT_SECS '{}' is not a positive integer, using {} seconds",
                        raw, DEFAULT_REQUEST_TIMEOUT_SECS
                    );
                    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        if twitter.credentials().is_ok() {
            info!("Twitter OAuth 1.0a credentials loaded");
        } else {
            warn!("Twitter credentials are incomplete - posting is disabled");
        }
        if openai.api_key().is_ok() {
            info!("OpenAI API key loaded");
        } else {
            warn!("OpenAI API key is missing - post generation is disabled");
        }

        AppConfig {
            twitter,
            openai,
            static_dir,
            request_timeout,
        }
    }
}

/// Reads a variable, treating unset and blank values alike.
fn load_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Reads a secret, logging only whether it was found and its length.
fn load_secret(name: &str) -> Option<String> {
    match load_optional(name) {
        Some(value) => {
            info!(
                "Found {} environment variable with length: {}",
                name,
                value.len()
            );
            Some(value)
        }
        None => {
            warn!("No {} found in environment variables", name);
            None
        }
    }
}

fn load_url(name: &str, default: &str) -> String {
    load_optional(name)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a u16.
/// If the environment variable is not set or cannot be parsed, it defaults to 5000.
///
/// # Example
///
/// ```rust
/// use postcraft::get_server_port;
///
/// std::env::remove_var("PORT");
/// assert_eq!(get_server_port(), 5000);
/// ```
pub fn get_server_port() -> u16 {
    match env::var("PORT") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("PORT '{}' is not a valid port number, using {}", raw, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    }
}
