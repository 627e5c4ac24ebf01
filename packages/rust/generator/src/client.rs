//! Completion service seam and the OpenAI-compatible HTTP client behind it.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use lexigen_shared::{GenerationSettings, Result, VocabError};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("Lexigen/", env!("CARGO_PKG_VERSION"));

/// Maximum number of characters of an error body echoed into an error message.
const MAX_ERROR_SNIPPET: usize = 200;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A text-completion service: one system message + one prompt in, raw text out.
///
/// Implementations must fail with `Misconfigured` before any network activity
/// when they lack a credential, `ServiceUnavailable` for transport, timeout, or
/// authentication failures, and `ServiceError` when the service itself reports
/// an error. They must not retry.
pub trait CompletionService: Send + Sync {
    fn complete(&self, system: &str, prompt: &str)
    -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
    #[serde(default)]
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// OpenAiClient
// ---------------------------------------------------------------------------

/// Client for the OpenAI-compatible `chat/completions` endpoint.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiClient {
    /// Build a client from resolved settings.
    ///
    /// A missing credential does not fail here; it fails each `complete` call
    /// with `Misconfigured` so a long-running server can report it per request.
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                VocabError::ServiceUnavailable(format!("failed to build HTTP client: {e}"))
            })?;

        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            http,
            endpoint,
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            timeout: settings.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn transport_error(&self, e: reqwest::Error) -> VocabError {
        if e.is_timeout() {
            VocabError::ServiceUnavailable(format!(
                "request timed out after {}s",
                self.timeout.as_secs_f64()
            ))
        } else {
            VocabError::ServiceUnavailable(format!("{}: {e}", self.endpoint))
        }
    }
}

impl CompletionService for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            VocabError::misconfigured("completion service API key is not configured")
        })?;

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        debug!(endpoint = %self.endpoint, "sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(VocabError::ServiceUnavailable(format!(
                "authentication rejected (HTTP {status}): {}",
                error_message(&body)
            )));
        }

        if !status.is_success() {
            return Err(VocabError::ServiceError(format!(
                "HTTP {status}: {}",
                error_message(&body)
            )));
        }

        let envelope: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            VocabError::ServiceError(format!("unexpected response envelope: {e}"))
        })?;

        if let Some(err) = envelope.error {
            return Err(VocabError::ServiceError(err.message));
        }

        if let Some(usage) = &envelope.usage {
            debug!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion usage"
            );
        }

        let choice = envelope.choices.into_iter().next().ok_or_else(|| {
            VocabError::ServiceError("response contained no choices".into())
        })?;

        debug!(finish_reason = ?choice.finish_reason, "completion received");

        choice
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| VocabError::ServiceError("response contained no completion text".into()))
    }
}

/// Extract the service's own error message from a response body, falling back
/// to a truncated copy of the body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".into();
    }

    match trimmed.char_indices().nth(MAX_ERROR_SNIPPET) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base: &str, api_key: Option<&str>) -> GenerationSettings {
        GenerationSettings {
            model: "gpt-4o".into(),
            base_url: Url::parse(base).unwrap(),
            api_key: api_key.map(String::from),
            timeout: Duration::from_secs(5),
        }
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 480, "total_tokens": 600}
        })
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = OpenAiClient::new(&settings("https://api.openai.com/v1", None)).unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");

        let client = OpenAiClient::new(&settings("http://localhost:8000/v1/", None)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn debug_does_not_leak_key() {
        let client = OpenAiClient::new(&settings("http://localhost", Some("sk-secret"))).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("has_api_key: true"));
    }

    #[test]
    fn error_message_prefers_service_message() {
        let body = r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#;
        assert_eq!(error_message(body), "Rate limit reached");
        assert_eq!(error_message("  "), "empty response body");

        let long = "x".repeat(500);
        let msg = error_message(&long);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.len(), MAX_ERROR_SNIPPET + 3);
    }

    #[tokio::test]
    async fn complete_returns_message_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/v1", server.uri());
        let client = OpenAiClient::new(&settings(&base, Some("sk-test"))).unwrap();
        let text = client.complete("sys", "hello").await.unwrap();
        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&settings(&server.uri(), None)).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(matches!(err, VocabError::Misconfigured { .. }));
    }

    #[tokio::test]
    async fn unauthorized_is_service_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&settings(&server.uri(), Some("sk-bad"))).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        match err {
            VocabError::ServiceUnavailable(msg) => {
                assert!(msg.contains("Incorrect API key provided"));
            }
            other => panic!("expected ServiceUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_status_is_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&settings(&server.uri(), Some("sk-test"))).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        match err {
            VocabError::ServiceError(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("Rate limit reached"));
            }
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_envelope_with_ok_status_is_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"message": "model overloaded"}
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&settings(&server.uri(), Some("sk-test"))).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(matches!(err, VocabError::ServiceError(ref m) if m == "model overloaded"));
    }

    #[tokio::test]
    async fn empty_choices_is_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&settings(&server.uri(), Some("sk-test"))).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(matches!(err, VocabError::ServiceError(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("{}"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut s = settings(&server.uri(), Some("sk-test"));
        s.timeout = Duration::from_millis(200);
        let client = OpenAiClient::new(&s).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(matches!(err, VocabError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_unavailable() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = OpenAiClient::new(&settings("http://127.0.0.1:9", Some("sk-test"))).unwrap();
        let err = client.complete("sys", "hello").await.unwrap_err();
        assert!(matches!(err, VocabError::ServiceUnavailable(_)));
    }
}
