//! Post generation through the OpenAI chat-completion API.
//!
//! This module validates the form attributes sent to `/generate`, turns them
//! into a prompt, and asks the configured chat model for a draft post.

use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::OpenAiConfig;
use crate::error::AppError;
use crate::oauth::build_bearer_auth_header;
use crate::twitter::sanitize_for_logging;

/// Instruction sent as the system message of every completion request.
pub const SYSTEM_PROMPT: &str = "You are a social media content expert. Generate engaging, authentic social media posts that match the specified tone and perspective.";

/// Upper bound on generated tokens.
const MAX_TOKENS: u32 = 300;

const TEMPERATURE: f64 = 0.7;

/// Form fields required by `/generate`, in the order they are reported.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "age",
    "country",
    "state",
    "interests",
    "tone",
    "perspective",
    "hookline",
];

/// Body of a successful chat-completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Validated form attributes describing the post to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub age: i64,
    pub country: String,
    pub state: String,
    pub interests: String,
    pub tone: String,
    pub perspective: String,
    pub hookline: String,
}

/// A generated draft together with the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    pub prompt: String,
    pub post: String,
}

/// A field counts as missing when it is absent or falsy: null, blank string,
/// zero, `false`, or an empty array or object.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
    }
}

/// Renders a field the way it appears in the prompt.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_age(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

impl PostRequest {
    /// Validates a raw `/generate` request body.
    ///
    /// # Returns
    ///
    /// - `Ok(PostRequest)`: If all seven fields are present and `age` is an
    ///   integer between 1 and 120
    /// - `Err(AppError::Validation)`: With the message shown to the user
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let data: Value = serde_json::from_slice(body)
            .ok()
            .filter(|data: &Value| !data.is_null())
            .ok_or_else(|| AppError::Validation("No JSON data received".to_string()))?;

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| is_blank(data.get(*field)))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let age = parse_age(&data["age"])
            .ok_or_else(|| AppError::Validation("Age must be a valid number".to_string()))?;
        if !(1..=120).contains(&age) {
            return Err(AppError::Validation(
                "Age must be between 1 and 120".to_string(),
            ));
        }

        Ok(PostRequest {
            age,
            country: field_text(&data["country"]),
            state: field_text(&data["state"]),
            interests: field_text(&data["interests"]),
            tone: field_text(&data["tone"]),
            perspective: field_text(&data["perspective"]),
            hookline: field_text(&data["hookline"]),
        })
    }

    /// Builds the user message sent to the chat model.
    pub fn prompt(&self) -> String {
        format!(
            "Generate a {} social media post for a {}-year-old from {}, {}, interested in {}. The perspective should be {}. Start with: \"{}\"",
            self.tone,
            self.age,
            self.state,
            self.country,
            self.interests,
            self.perspective,
            self.hookline
        )
    }
}

/// Extracts a failure reason from an OpenAI error body (`error.message`).
fn extract_openai_error(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status))
}

/// Generates a draft post for the given form attributes.
///
/// # Parameters
///
/// - `client`: HTTP client (carries the request timeout)
/// - `config`: OpenAI settings
/// - `request`: Validated form attributes
///
/// # Returns
///
/// - `Ok(GeneratedPost)`: The prompt and the trimmed completion text
/// - `Err(AppError)`: `Configuration` without an API key, `Transport` on
///   network failure, `Generation` on an error status or unusable body
pub async fn generate_post(
    client: &Client,
    config: &OpenAiConfig,
    request: &PostRequest,
) -> Result<GeneratedPost, AppError> {
    let api_key = config.api_key()?;
    let prompt = request.prompt();

    let payload = json!({
        "model": config.model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": prompt}
        ],
        "max_tokens": MAX_TOKENS,
        "temperature": TEMPERATURE
    });

    let url = config.completions_endpoint();
    info!("Requesting completion from {} ({})", url, config.model);
    debug!("Prompt: {}", sanitize_for_logging(&prompt, 200));

    let response = client
        .post(&url)
        .header("Authorization", build_bearer_auth_header(api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.bytes().await?;
    info!("Received completion response with status: {}", status);

    if !response_is_success(status) {
        error!(
            "OpenAI request failed - Status: {}, body: {}",
            status,
            sanitize_for_logging(&String::from_utf8_lossy(&body), 200)
        );
        return Err(AppError::Generation(extract_openai_error(status, &body)));
    }

    let completion: ChatCompletion = serde_json::from_slice(&body)
        .map_err(|e| AppError::Generation(format!("invalid response body: {}", e)))?;
    let post = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| AppError::Generation("response contained no content".to_string()))?;

    info!("Successfully generated post ({} characters)", post.chars().count());
    Ok(GeneratedPost { prompt, post })
}

fn response_is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn valid_body() -> Value {
        json!({
            "age": "29",
            "country": "USA",
            "state": "Oregon",
            "interests": "hiking",
            "tone": "friendly",
            "perspective": "first person",
            "hookline": "Guess what?"
        })
    }

    fn parse(body: &Value) -> Result<PostRequest, AppError> {
        PostRequest::from_body(body.to_string().as_bytes())
    }

    fn validation_message(result: Result<PostRequest, AppError>) -> String {
        match result {
            Err(AppError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn test_config(api_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            api_url: api_url.to_string(),
            model: "gpt-4".to_string(),
        }
    }

    #[test]
    fn test_prompt_format() {
        let request = parse(&valid_body()).unwrap();
        assert_eq!(
            request.prompt(),
            "Generate a friendly social media post for a 29-year-old from Oregon, USA, interested in hiking. The perspective should be first person. Start with: \"Guess what?\""
        );
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut body = valid_body();
        body["tone"] = json!("   ");
        body.as_object_mut().unwrap().remove("age");
        body["hookline"] = Value::Null;

        assert_eq!(
            validation_message(parse(&body)),
            "Missing required fields: age, tone, hookline"
        );
    }

    #[test]
    fn test_no_json() {
        assert_eq!(
            validation_message(PostRequest::from_body(b"")),
            "No JSON data received"
        );
        assert_eq!(
            validation_message(PostRequest::from_body(b"null")),
            "No JSON data received"
        );
    }

    #[test]
    fn test_age_validation() {
        let mut body = valid_body();
        body["age"] = json!("twenty");
        assert_eq!(validation_message(parse(&body)), "Age must be a valid number");

        body["age"] = json!(121);
        assert_eq!(
            validation_message(parse(&body)),
            "Age must be between 1 and 120"
        );

        body["age"] = json!(-3);
        assert_eq!(
            validation_message(parse(&body)),
            "Age must be between 1 and 120"
        );

        body["age"] = json!(0);
        assert_eq!(
            validation_message(parse(&body)),
            "Missing required fields: age"
        );

        body["age"] = json!(42.9);
        assert_eq!(parse(&body).unwrap().age, 42);

        body["age"] = json!(" 7 ");
        assert_eq!(parse(&body).unwrap().age, 7);
    }

    #[test]
    fn test_non_string_fields_rendered() {
        let mut body = valid_body();
        body["interests"] = json!(["hiking", "tea"]);
        let request = parse(&body).unwrap();
        assert_eq!(request.interests, r#"["hiking","tea"]"#);
    }

    #[tokio::test]
    async fn test_generate_post_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "max_tokens": 300,
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "  Guess what? Trails!  "}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = parse(&valid_body()).unwrap();
        let generated = generate_post(&Client::new(), &test_config(&mock_server.uri()), &request)
            .await
            .unwrap();

        assert_eq!(generated.post, "Guess what? Trails!");
        assert_eq!(generated.prompt, request.prompt());

        let requests = mock_server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(sent["messages"][1]["role"], "user");
        assert_eq!(sent["messages"][1]["content"], request.prompt().as_str());
    }

    #[tokio::test]
    async fn test_generate_post_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&mock_server)
            .await;

        let request = parse(&valid_body()).unwrap();
        match generate_post(&Client::new(), &test_config(&mock_server.uri()), &request).await {
            Err(AppError::Generation(message)) => {
                assert_eq!(message, "Incorrect API key provided")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_post_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let request = parse(&valid_body()).unwrap();
        let err = generate_post(&Client::new(), &test_config(&mock_server.uri()), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[tokio::test]
    async fn test_generate_post_null_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]
            })))
            .mount(&mock_server)
            .await;

        let request = parse(&valid_body()).unwrap();
        let err = generate_post(&Client::new(), &test_config(&mock_server.uri()), &request)
            .await
            .unwrap_err();
        match err {
            AppError::Generation(message) => assert_eq!(message, "response contained no content"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_post_without_key_sends_nothing() {
        let mock_server = MockServer::start().await;
        let mut config = test_config(&mock_server.uri());
        config.api_key = None;

        let request = parse(&valid_body()).unwrap();
        let err = generate_post(&Client::new(), &config, &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }
}
