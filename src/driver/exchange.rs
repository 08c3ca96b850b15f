//! Chat driver - runs one user message through at most one tool round.
//!
//! Each exchange:
//! 1. Sends the user message with the tool catalog attached
//! 2. If the model asks for tools, runs them in order and appends one
//!    `tool` message per invocation
//! 3. Sends the extended conversation again, without the catalog
//! 4. Returns the final assistant text

use std::sync::Arc;

use serde_json::Value;

use super::narrate::Narrator;
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message, ToolCall, Usage};
use crate::tools::{ToolRegistry, ToolResult};

/// Where an exchange currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// First request sent, no answer yet
    AwaitingFirstResponse,
    /// Model asked for tools; results are being gathered and sent back
    AwaitingToolResults,
    /// Final answer available
    Done,
}

impl ExchangeState {
    /// Next state once the first response has arrived
    fn after_first_response(self, requested_tools: bool) -> Self {
        debug_assert_eq!(self, ExchangeState::AwaitingFirstResponse);
        if requested_tools {
            ExchangeState::AwaitingToolResults
        } else {
            ExchangeState::Done
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExchangeState::Done)
    }
}

/// One tool invocation and what it returned
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call: ToolCall,
    pub result: ToolResult,
}

/// Record of a finished exchange
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Final assistant text
    pub answer: String,
    /// Full conversation, including the final assistant message
    pub conversation: Vec<Message>,
    /// Tool invocations in the order the model requested them
    pub invocations: Vec<ToolInvocation>,
    /// Terminal state reached
    pub state: ExchangeState,
    /// Tokens spent across both requests
    pub usage: Usage,
    /// Model that answered
    pub model: String,
    /// Why the model stopped generating the final answer, if reported
    pub done_reason: Option<String>,
}

impl Exchange {
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Whether the model used any tools
    pub fn used_tools(&self) -> bool {
        !self.invocations.is_empty()
    }
}

/// Configuration for the ChatDriver.
#[derive(Debug, Clone)]
pub struct ChatDriverConfig {
    /// Print progress narration to stdout
    pub narrate: bool,
}

impl Default for ChatDriverConfig {
    fn default() -> Self {
        Self { narrate: true }
    }
}

/// Drives tool-calling exchanges against an LLM client.
pub struct ChatDriver<L>
where
    L: LlmClient,
{
    /// LLM client for completions
    llm: Arc<L>,
    /// Tools the model may call
    registry: ToolRegistry,
    /// Progress output
    narrator: Narrator,
}

impl<L> ChatDriver<L>
where
    L: LlmClient,
{
    /// Create a driver with a custom tool set and configuration.
    pub fn with_config(llm: Arc<L>, registry: ToolRegistry, config: ChatDriverConfig) -> Self {
        Self {
            llm,
            registry,
            narrator: Narrator::new(config.narrate),
        }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// Run one exchange for `user_text`.
    ///
    /// Transport and response-shape failures propagate; tool failures are
    /// handed to the model as `error` results and never abort the exchange.
    pub async fn run_exchange(&self, user_text: &str) -> Result<Exchange> {
        let mut state = ExchangeState::AwaitingFirstResponse;
        let mut conversation = vec![Message::user(user_text)];
        let mut usage = Usage::default();

        self.narrator.user(user_text);
        log::info!("Starting exchange with {} ({} chars)", self.llm.model(), user_text.len());

        // 1. First request carries the catalog
        let request = CompletionRequest::new(conversation.clone()).with_tools(self.registry.catalog());
        let response = self.llm.complete(request).await?;
        usage.add(&response.usage);

        state = state.after_first_response(response.needs_tool_execution());
        tracing::debug!(?state, tool_calls = response.tool_calls().len(), "First response received");

        if state.is_terminal() {
            let answer = response.message.content.clone();
            conversation.push(response.message);
            self.narrator.answer(&answer);
            return Ok(Exchange {
                answer,
                conversation,
                invocations: Vec::new(),
                state,
                usage,
                model: self.llm.model().to_string(),
                done_reason: response.done_reason,
            });
        }

        // 2. Run the requested tools, in order
        self.narrator.calling_tools();
        let calls = response.message.tool_calls.clone();
        conversation.push(response.message);

        let mut invocations = Vec::with_capacity(calls.len());
        for call in calls {
            self.narrator.tool_call(call.name(), &call.function.arguments);
            let result = self.registry.dispatch(&call);
            let content = result.to_content();
            self.narrator.tool_result(&content);

            conversation.push(Message::tool(content));
            invocations.push(ToolInvocation { call, result });
        }

        // 3. Follow-up without the catalog: one round only
        let request = CompletionRequest::new(conversation.clone());
        let follow_up = self.llm.complete(request).await?;
        usage.add(&follow_up.usage);

        if follow_up.needs_tool_execution() {
            tracing::warn!(
                tool_calls = follow_up.tool_calls().len(),
                "Ignoring tool calls in follow-up response"
            );
        }

        state = ExchangeState::Done;
        tracing::debug!(done_reason = ?follow_up.done_reason, "Follow-up response received");
        let answer = follow_up.message.content.clone();
        conversation.push(follow_up.message);
        self.narrator.answer(&answer);
        log::info!("Exchange done after {} tool call(s)", invocations.len());

        Ok(Exchange {
            answer,
            conversation,
            invocations,
            state,
            usage,
            model: self.llm.model().to_string(),
            done_reason: follow_up.done_reason,
        })
    }
}

/// Arguments as the model sent them, for narration
pub(super) fn format_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::llm::{CompletionResponse, MockLlmClient, Role};
    use crate::tools::ToolKind;
    use serde_json::json;

    fn quiet_driver(llm: Arc<MockLlmClient>) -> ChatDriver<MockLlmClient> {
        ChatDriver::with_config(llm, ToolRegistry::standard(), ChatDriverConfig { narrate: false })
    }

    #[tokio::test]
    async fn test_direct_answer_returned_unmodified() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("  Hello, *world*!\n")]));
        let driver = quiet_driver(llm.clone());

        let exchange = driver.run_exchange("Hi").await.unwrap();

        assert_eq!(exchange.answer(), "  Hello, *world*!\n");
        assert_eq!(exchange.state, ExchangeState::Done);
        assert!(!exchange.used_tools());
        assert_eq!(llm.requests().len(), 1);
        assert_eq!(exchange.model, "mock-model");
        assert_eq!(exchange.done_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_empty_direct_answer() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("")]));
        let exchange = quiet_driver(llm).run_exchange("Hi").await.unwrap();
        assert_eq!(exchange.answer(), "");
    }

    #[tokio::test]
    async fn test_first_request_carries_catalog() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("ok")]));
        quiet_driver(llm.clone()).run_exchange("What's the current time?").await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests[0].messages, vec![Message::user("What's the current time?")]);
        assert_eq!(requests[0].tools, ToolRegistry::standard().catalog());
    }

    #[tokio::test]
    async fn test_tool_round_appends_results_in_order() {
        let calls = vec![
            ToolCall::new("get_current_time", json!({"timezone": "Europe/Rome"})),
            ToolCall::new("calculate", json!({"expression": "2 ^ 10"})),
        ];
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::with_tool_calls(calls.clone()),
            CompletionResponse::text("It is noon and 2^10 is 1024."),
        ]));
        let driver = quiet_driver(llm.clone());

        let exchange = driver.run_exchange("What time is it and what is 2 to the power of 10?").await.unwrap();
        assert_eq!(exchange.answer(), "It is noon and 2^10 is 1024.");
        assert_eq!(exchange.state, ExchangeState::Done);

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);

        // user, assistant(tool_calls), tool, tool
        let follow_up = &requests[1];
        assert!(follow_up.tools.is_empty());
        assert_eq!(follow_up.messages.len(), 4);
        assert_eq!(follow_up.messages[1].role, Role::Assistant);
        assert_eq!(follow_up.messages[1].tool_calls, calls);

        let time: Value = serde_json::from_str(&follow_up.messages[2].content).unwrap();
        assert_eq!(follow_up.messages[2].role, Role::Tool);
        assert_eq!(time["timezone"], "Europe/Rome");

        let calc: Value = serde_json::from_str(&follow_up.messages[3].content).unwrap();
        assert_eq!(follow_up.messages[3].role, Role::Tool);
        assert_eq!(calc["result"], 1024);

        assert_eq!(exchange.invocations.len(), 2);
        assert_eq!(exchange.invocations[0].call.name(), "get_current_time");
        assert_eq!(exchange.invocations[1].call.name(), "calculate");
        assert_eq!(exchange.conversation.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_tool_does_not_abort() {
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::with_tool_calls(vec![ToolCall::new("launch_rockets", json!({}))]),
            CompletionResponse::text("I can't do that."),
        ]));
        let exchange = quiet_driver(llm.clone()).run_exchange("Launch").await.unwrap();

        assert_eq!(exchange.answer(), "I can't do that.");
        let tool_msg = &llm.requests()[1].messages[2];
        let payload: Value = serde_json::from_str(&tool_msg.content).unwrap();
        assert_eq!(payload, json!({"error": "Unknown function: launch_rockets"}));
    }

    #[tokio::test]
    async fn test_evaluation_failure_reaches_model() {
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::with_tool_calls(vec![ToolCall::new("calculate", json!({"expression": "abc"}))]),
            CompletionResponse::text("That is not math."),
        ]));
        let exchange = quiet_driver(llm).run_exchange("abc?").await.unwrap();
        assert!(exchange.invocations[0].result.is_error());
    }

    #[tokio::test]
    async fn test_follow_up_tool_calls_ignored() {
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse::with_tool_calls(vec![ToolCall::new("calculate", json!({"expression": "1 + 1"}))]),
            CompletionResponse::with_tool_calls(vec![ToolCall::new("calculate", json!({"expression": "2 + 2"}))]),
        ]));
        let exchange = quiet_driver(llm.clone()).run_exchange("Add").await.unwrap();

        assert_eq!(exchange.answer(), "");
        assert_eq!(exchange.invocations.len(), 1);
        assert_eq!(llm.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::with_tool_calls(vec![
            ToolCall::new("calculate", json!({"expression": "1 + 1"})),
        ])]));
        let result = quiet_driver(llm).run_exchange("Add").await;
        assert!(matches!(result, Err(ChatError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_exchanges_are_independent() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("a"), CompletionResponse::text("b")]));
        let driver = quiet_driver(llm.clone());

        driver.run_exchange("first").await.unwrap();
        driver.run_exchange("second").await.unwrap();

        let requests = llm.requests();
        assert_eq!(requests[1].messages, vec![Message::user("second")]);
    }

    #[tokio::test]
    async fn test_usage_accumulates_across_requests() {
        let mut first = CompletionResponse::with_tool_calls(vec![ToolCall::new("get_current_time", json!({}))]);
        first.usage = Usage::new(10, 2);
        let mut second = CompletionResponse::text("now");
        second.usage = Usage::new(20, 4);

        let llm = Arc::new(MockLlmClient::new(vec![first, second]));
        let exchange = quiet_driver(llm).run_exchange("time?").await.unwrap();
        assert_eq!(exchange.usage, Usage::new(30, 6));
    }

    #[tokio::test]
    async fn test_custom_registry_limits_catalog() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolKind::Calculate);
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("ok")]));
        let driver = ChatDriver::with_config(llm.clone(), registry, ChatDriverConfig { narrate: false });

        driver.run_exchange("hi").await.unwrap();
        assert_eq!(llm.requests()[0].tools.len(), 1);
    }

    #[test]
    fn test_state_transitions() {
        let start = ExchangeState::AwaitingFirstResponse;
        assert_eq!(start.after_first_response(false), ExchangeState::Done);
        assert_eq!(start.after_first_response(true), ExchangeState::AwaitingToolResults);
        assert!(ExchangeState::Done.is_terminal());
        assert!(!ExchangeState::AwaitingToolResults.is_terminal());
    }

    #[test]
    fn test_format_arguments() {
        assert_eq!(format_arguments(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(format_arguments(&json!("{\"a\": 1}")), "{\"a\": 1}");
    }
}
