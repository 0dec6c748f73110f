/// LLM Client — the single point of entry for all model calls in NexusConnect.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Services depend on the `ModelProvider` trait; `LlmClient` is the production backend.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in NexusConnect.
pub const MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content, mirroring the Messages API wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Block types this client does not consume (e.g. thinking).
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// A capability the model may invoke mid-generation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Provider-agnostic completion request built by services.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            messages: vec![Message::user_text(prompt)],
            tools: Vec::new(),
            temperature: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Copy)]
pub struct ToolCall<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// All tool invocations in the order the model emitted them.
    pub fn tool_calls(&self) -> Vec<ToolCall<'_>> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall { id, name, input }),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Seam between services and the model backend. Carried as `Arc<dyn ModelProvider>`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, LlmError>;
}

/// Client tuning knobs, filled from `Config`.
///
/// `max_retries` counts retries after the first attempt, so `0` means a single call.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff_base: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: ANTHROPIC_API_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// Wraps the Anthropic Messages API with timeout, retry logic and tool-use support.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    max_retries: u32,
    backoff_base: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, settings: LlmSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(settings.timeout).build()?,
            api_key,
            api_url: settings.api_url,
            max_retries: settings.max_retries,
            backoff_base: settings.backoff_base,
        })
    }
}

#[async_trait]
impl ModelProvider for LlmClient {
    /// Makes a raw call to the Claude API, returning the full response object.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: &request.messages,
            tools: &request.tools,
            temperature: request.temperature,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_base * (1u32 << (attempt - 1).min(5));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;
            if llm_response.content.is_empty() {
                return Err(LlmError::EmptyContent);
            }

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}, stop_reason={:?}",
                llm_response.usage.input_tokens,
                llm_response.usage.output_tokens,
                llm_response.stop_reason
            );

            return Ok(llm_response);
        }

        // Still throttled after the final retry.
        Err(match last_error {
            Some(LlmError::Api { status: 429, .. }) | None => LlmError::RateLimited {
                retries: self.max_retries,
            },
            Some(err) => err,
        })
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_response_with_tool_use_deserializes() {
        let body = json!({
            "content": [
                {"type": "text", "text": "Let me check that skill."},
                {"type": "tool_use", "id": "toolu_01", "name": "shouldEmphasizeSkill",
                 "input": {"skill": "Figma", "projectNeeds": "Figma designer"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 40}
        });

        let response: LlmResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text(), Some("Let me check that skill."));
        let calls = response.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "shouldEmphasizeSkill");
        assert_eq!(calls[0].input["skill"], "Figma");
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    }

    #[test]
    fn test_unknown_block_types_are_tolerated() {
        let body = json!({
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "abc"},
                {"type": "text", "text": "{}"}
            ],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        });

        let response: LlmResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.content[0], ContentBlock::Unsupported);
        assert_eq!(response.text(), Some("{}"));
    }

    #[test]
    fn test_tool_result_omits_is_error_when_false() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_01".to_string(),
            content: "true".to_string(),
            is_error: false,
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert!(value.get("is_error").is_none());
    }

    #[test]
    fn test_request_omits_empty_tools_and_temperature() {
        let request = CompletionRequest::new("system", "prompt");
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: &request.messages,
            tools: &request.tools,
            temperature: request.temperature,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("temperature").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
    }

    /// Local stand-in for the Messages endpoint that replays canned `(status, body)` pairs.
    struct StubApi {
        replies: Mutex<VecDeque<(StatusCode, Value)>>,
        hits: AtomicUsize,
    }

    async fn stub_messages(State(stub): State<Arc<StubApi>>) -> (StatusCode, Json<Value>) {
        stub.hits.fetch_add(1, Ordering::SeqCst);
        let (status, body) = stub
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({})));
        (status, Json(body))
    }

    async fn spawn_stub(replies: Vec<(StatusCode, Value)>) -> (String, Arc<StubApi>) {
        let stub = Arc::new(StubApi {
            replies: Mutex::new(replies.into()),
            hits: AtomicUsize::new(0),
        });
        let router = Router::new()
            .route("/v1/messages", post(stub_messages))
            .with_state(stub.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}/v1/messages"), stub)
    }

    fn client_for(api_url: String, max_retries: u32) -> LlmClient {
        LlmClient::new(
            "test-key".to_string(),
            LlmSettings {
                api_url,
                timeout: Duration::from_secs(5),
                max_retries,
                backoff_base: Duration::from_millis(1),
            },
        )
        .unwrap()
    }

    fn ok_body() -> Value {
        json!({
            "content": [{"type": "text", "text": "{}"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 3, "output_tokens": 1}
        })
    }

    fn overloaded() -> (StatusCode, Value) {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": {"type": "overloaded_error", "message": "Overloaded"}}),
        )
    }

    #[test]
    fn test_default_settings_target_anthropic() {
        let settings = LlmSettings::default();
        assert_eq!(settings.api_url, ANTHROPIC_API_URL);
        assert_eq!(settings.max_retries, 3);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_until_success() {
        let (url, stub) =
            spawn_stub(vec![overloaded(), overloaded(), (StatusCode::OK, ok_body())]).await;
        let client = client_for(url, 2);

        let response = client
            .complete(&CompletionRequest::new("system", "prompt"))
            .await
            .unwrap();

        assert_eq!(response.text(), Some("{}"));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_fail_without_retry() {
        let (url, stub) = spawn_stub(vec![(
            StatusCode::BAD_REQUEST,
            json!({"error": {"type": "invalid_request_error", "message": "max_tokens too large"}}),
        )])
        .await;
        let client = client_for(url, 3);

        let err = client
            .complete(&CompletionRequest::new("system", "prompt"))
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "max_tokens too large");
            }
            other => panic!("expected API error, got {other:?}"),
        }
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_last_server_error_surfaces_when_retries_run_out() {
        let (url, stub) = spawn_stub(vec![overloaded(), overloaded(), overloaded()]).await;
        let client = client_for(url, 2);

        let err = client
            .complete(&CompletionRequest::new("system", "prompt"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_persistent_throttling_reports_rate_limited() {
        let throttled = (
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"type": "rate_limit_error", "message": "slow down"}}),
        );
        let (url, stub) = spawn_stub(vec![throttled.clone(), throttled]).await;
        let client = client_for(url, 1);

        let err = client
            .complete(&CompletionRequest::new("system", "prompt"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::RateLimited { retries: 1 }));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_makes_a_single_attempt() {
        let (url, stub) = spawn_stub(vec![overloaded(), (StatusCode::OK, ok_body())]).await;
        let client = client_for(url, 0);

        let err = client
            .complete(&CompletionRequest::new("system", "prompt"))
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    }
}
