//! Ollama chat API client implementation
//!
//! This module implements the LlmClient trait for Ollama's `/api/chat`
//! endpoint (non-streaming).

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{ChatError, Result};
use crate::llm::client::LlmClient;
use crate::llm::types::{CompletionRequest, CompletionResponse, Message, Usage};

/// Default chat endpoint of a local Ollama server
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/chat";

/// Default model to use
pub const DEFAULT_MODEL: &str = "qwen2.5-coder:14b";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the Ollama client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl OllamaConfig {
    /// Create a config pointing at a specific endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ollama chat API client
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
    usage: Mutex<Usage>,
}

impl OllamaClient {
    /// Create a new client for the configured endpoint
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Client(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            usage: Mutex::new(Usage::default()),
        })
    }

    /// Endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Build the request body for the chat endpoint
    fn build_request(&self, request: &CompletionRequest) -> Result<Value> {
        let mut body = json!({
            "model": self.config.model,
            "messages": serde_json::to_value(&request.messages)?,
            "stream": false
        });

        // Add tools if present
        if !request.tools.is_empty() {
            body["tools"] = serde_json::to_value(&request.tools)?;
        }

        Ok(body)
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        let response = parse_response(body)?;

        let mut total = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        total.add(&response.usage);

        Ok(response)
    }

    /// Send a request to the chat endpoint
    async fn send_request(&self, body: Value) -> Result<Value> {
        log::debug!("POST {} ({} bytes)", self.config.endpoint, body.to_string().len());

        let response = self.client.post(&self.config.endpoint).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatError::Api {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ChatError::InvalidResponse(format!("body is not JSON: {}", e)))
    }

    /// Get cumulative token usage
    pub fn total_usage(&self) -> Usage {
        *self.usage.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Parse a raw `/api/chat` response body
///
/// The assistant `message` object is required; `done_reason` and the eval
/// counters are optional.
pub fn parse_response(body: Value) -> Result<CompletionResponse> {
    let message = match body.get("message") {
        Some(m) if m.is_object() => m.clone(),
        _ => {
            let detail = body
                .get("error")
                .and_then(|e| e.as_str())
                .map(|e| format!("server error: {}", e))
                .unwrap_or_else(|| "missing 'message' object".to_string());
            return Err(ChatError::InvalidResponse(detail));
        }
    };

    let message: Message = serde_json::from_value(message)
        .map_err(|e| ChatError::InvalidResponse(format!("malformed message: {}", e)))?;

    let done_reason = body.get("done_reason").and_then(|r| r.as_str()).map(str::to_string);

    let usage = Usage::new(
        body.get("prompt_eval_count").and_then(|v| v.as_u64()).unwrap_or(0),
        body.get("eval_count").and_then(|v| v.as_u64()).unwrap_or(0),
    );

    Ok(CompletionResponse {
        message,
        done_reason,
        usage,
    })
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request)?;
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{Role, ToolCall, ToolDefinition};

    fn client() -> OllamaClient {
        OllamaClient::new(OllamaConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_config_builder() {
        let config = OllamaConfig::with_endpoint("http://10.0.0.2:11434/api/chat")
            .model("llama3.2")
            .timeout(Duration::from_secs(5));
        assert_eq!(config.endpoint, "http://10.0.0.2:11434/api/chat");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_build_request_basic() {
        let request = CompletionRequest::default().with_user_message("Hello");
        let body = client().build_request(&request).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_build_request_with_tools() {
        let tool = ToolDefinition::function(
            "calculate",
            "Perform a mathematical calculation",
            json!({
                "type": "object",
                "properties": {
                    "expression": { "type": "string" }
                },
                "required": ["expression"]
            }),
        );

        let request = CompletionRequest::default()
            .with_user_message("What is 2 + 2?")
            .with_tools(vec![tool]);
        let body = client().build_request(&request).unwrap();

        assert!(body["tools"].is_array());
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "calculate");
    }

    #[test]
    fn test_build_request_uses_configured_model() {
        let client = OllamaClient::new(OllamaConfig::default().model("llama3.2")).unwrap();
        let body = client.build_request(&CompletionRequest::default().with_user_message("Hello")).unwrap();
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(client.model(), "llama3.2");
    }

    #[test]
    fn test_parse_response_text_only() {
        let response = client()
            .parse_response(json!({
                "model": "qwen2.5-coder:14b",
                "created_at": "2024-01-01T00:00:00Z",
                "message": { "role": "assistant", "content": "Hello there!" },
                "done": true,
                "done_reason": "stop",
                "prompt_eval_count": 10,
                "eval_count": 5
            }))
            .unwrap();

        assert_eq!(response.content(), "Hello there!");
        assert_eq!(response.message.role, Role::Assistant);
        assert!(!response.needs_tool_execution());
        assert_eq!(response.done_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage, Usage::new(10, 5));
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let response = client()
            .parse_response(json!({
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [
                        { "function": { "name": "get_current_time", "arguments": {} } },
                        { "function": { "name": "calculate", "arguments": { "expression": "2 ^ 10" } } }
                    ]
                },
                "done": true
            }))
            .unwrap();

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name(), "get_current_time");
        assert_eq!(calls[1], ToolCall::new("calculate", json!({ "expression": "2 ^ 10" })));
    }

    #[test]
    fn test_parse_response_missing_message() {
        let result = parse_response(json!({ "done": true }));
        assert!(matches!(result, Err(ChatError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_response_server_error_body() {
        let err = parse_response(json!({ "error": "model 'nope' not found" })).unwrap_err();
        assert!(err.to_string().contains("model 'nope' not found"));
    }

    #[test]
    fn test_parse_response_bad_role() {
        let result = parse_response(json!({ "message": { "role": "narrator", "content": "x" } }));
        assert!(matches!(result, Err(ChatError::InvalidResponse(_))));
    }

    #[test]
    fn test_total_usage_accumulation() {
        let client = client();
        for (input, output) in [(100, 50), (200, 100)] {
            client
                .parse_response(json!({
                    "message": { "role": "assistant", "content": "" },
                    "prompt_eval_count": input,
                    "eval_count": output
                }))
                .unwrap();
        }

        assert_eq!(client.total_usage(), Usage::new(300, 150));
    }

    #[test]
    fn test_debug_impl() {
        let debug_str = format!("{:?}", client());
        assert!(debug_str.contains("OllamaClient"));
        assert!(debug_str.contains(DEFAULT_ENDPOINT));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OllamaClient>();
    }
}
