//! Tweet operations for Twitter API.
//!
//! This module contains the function that publishes a post through the
//! Twitter API v2, signed with OAuth 1.0a.

use log::{debug, info};
use reqwest::Client;
use serde_json::json;

use crate::config::TwitterConfig;
use crate::error::AppError;
use crate::oauth::OAuthSigner;

use super::api::interpret_post_response;
use super::text::enforce_length;

/// Prefix of the public URL of a post; the post id is appended.
const TWEET_URL_PREFIX: &str = "https://twitter.com/user/status/";

/// A successfully published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedTweet {
    pub id: String,
    pub url: String,
    /// The text that was actually sent, after length enforcement.
    pub text: String,
}

/// Builds the canonical public URL of a post.
pub fn tweet_url(id: &str) -> String {
    format!("{}{}", TWEET_URL_PREFIX, id)
}

/// Posts a tweet to Twitter/X using the API v2 endpoint.
///
/// The text is clipped to 280 characters, the request is signed with
/// OAuth 1.0a for the configured account, and the response is classified.
/// The request is not retried: a second call creates a second post.
///
/// # Parameters
///
/// - `client`: HTTP client (carries the request timeout)
/// - `config`: Twitter settings, including the OAuth credentials
/// - `text`: The text content of the tweet to post
///
/// # Returns
///
/// - `Ok(PostedTweet)`: The id and URL of the created post
/// - `Err(AppError)`: `Configuration` if a credential is missing (nothing is
///   sent), `Transport` on network failure or timeout, `UpstreamRejection` on a
///   non-2xx status, `UpstreamProtocol` on a 2xx without a post id
///
/// # Example
///
/// ```rust,no_run
/// use postcraft::{post_tweet, AppConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let config = AppConfig::from_env();
///     let client = reqwest::Client::new();
///     match post_tweet(&client, &config.twitter, "Hello from Rust!").await {
///         Ok(tweet) => println!("Tweet posted: {}", tweet.url),
///         Err(e) => eprintln!("Failed to post tweet: {}", e),
///     }
/// }
/// ```
pub async fn post_tweet(
    client: &Client,
    config: &TwitterConfig,
    text: &str,
) -> Result<PostedTweet, AppError> {
    let credentials = config.credentials()?;

    let text = enforce_length(text);
    info!(
        "Starting tweet post operation ({} characters)",
        text.chars().count()
    );

    let url = config.tweets_endpoint();
    debug!("Building OAuth 1.0a authorization header");
    let auth_header = OAuthSigner::new(&credentials).sign("POST", &url)?;

    let payload = json!({ "text": text });

    info!("Sending POST request to Twitter API v2");
    debug!("Request URL: {}", url);
    debug!("Request headers: Authorization: OAuth [REDACTED], Content-Type: application/json");

    let response = client
        .post(&url)
        .header("Authorization", auth_header)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status().as_u16();
    info!("Received response with status: {}", status);
    let body = response.bytes().await?;
    debug!("Response summary: {} bytes received", body.len());

    let id = interpret_post_response(status, &body)?;
    info!("Successfully posted to Twitter: {}", id);

    Ok(PostedTweet {
        url: tweet_url(&id),
        id,
        text,
    })
}
