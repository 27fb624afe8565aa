//! Twitter/X API integration module.
//!
//! This module contains the request validation, length enforcement and
//! OAuth 1.0a signed posting used by the `/post-to-twitter` endpoint.

mod api;
mod text;
mod tweets;

// Re-export public API
pub use text::{
    enforce_length, extract_post_text, strip_line_ending, ELLIPSIS, MAX_TWEET_CHARS,
};
pub use tweets::{post_tweet, tweet_url, PostedTweet};

// Crate-internal re-exports (used by other modules)
pub(crate) use api::sanitize_for_logging;
