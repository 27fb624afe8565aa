//! Tweet text validation and length enforcement.

use serde_json::Value;

use crate::error::AppError;

/// Maximum tweet length, counted in characters.
pub const MAX_TWEET_CHARS: usize = 280;

/// Marker appended to text that had to be shortened.
pub const ELLIPSIS: &str = "...";

/// Extracts the post text from a raw `/post-to-twitter` request body.
///
/// # Returns
///
/// - `Ok(String)`: The `post` field, unmodified
/// - `Err(AppError::Validation)`: If the body is absent or not JSON, or the
///   `post` field is missing, not a string, or blank
pub fn extract_post_text(body: &[u8]) -> Result<String, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::Validation("No JSON data received".to_string()));
    }

    let data: Value = serde_json::from_slice(body)
        .map_err(|_| AppError::Validation("No JSON data received".to_string()))?;
    if data.is_null() {
        return Err(AppError::Validation("No JSON data received".to_string()));
    }

    match data.get("post").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(AppError::Validation("No post text provided".to_string())),
    }
}

/// Drops the line terminator left by reading a line from a terminal.
///
/// Other leading and trailing whitespace is part of the post and is kept, so
/// a line typed at the console is posted the same way as a `post` field sent
/// over HTTP.
pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(&['\r', '\n'][..])
}

/// Clips text to [`MAX_TWEET_CHARS`].
///
/// Text at or under the limit is returned unchanged. Longer text keeps its
/// first `MAX_TWEET_CHARS - 3` characters followed by [`ELLIPSIS`], so the
/// result is exactly `MAX_TWEET_CHARS` long.
///
/// # Example
///
/// ```rust
/// use postcraft::twitter::enforce_length;
///
/// let clipped = enforce_length(&"a".repeat(300));
/// assert_eq!(clipped.chars().count(), 280);
/// assert!(clipped.ends_with("..."));
/// ```
pub fn enforce_length(text: &str) -> String {
    if text.chars().count() <= MAX_TWEET_CHARS {
        return text.to_string();
    }

    let keep = MAX_TWEET_CHARS - ELLIPSIS.chars().count();
    let mut clipped: String = text.chars().take(keep).collect();
    clipped.push_str(ELLIPSIS);
    clipped
}
