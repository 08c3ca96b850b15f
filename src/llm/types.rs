//! LLM types for Ollama chat API communication
//!
//! This module defines the conversation, tool, request and response types
//! exchanged with the chat endpoint.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A message in the conversation
///
/// Assistant messages may carry the tool invocations the model asked for;
/// every other role only carries text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Create a tool result message
    pub fn tool(content: impl Into<String>) -> Self {
        Self::text(Role::Tool, content)
    }

    /// Create an assistant message that requests tool invocations
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Whether the model asked for at least one tool invocation
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Ollama sends `null` for absent content and tool lists on some models.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub function: FunctionCall,
}

/// Name and arguments of a requested invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    /// Requested tool name
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Arguments as a JSON object.
    ///
    /// OpenAI-style servers encode the arguments as a JSON string; those are
    /// decoded here. Missing arguments become an empty object.
    pub fn arguments(&self) -> serde_json::Result<Value> {
        match &self.function.arguments {
            Value::Null => Ok(Value::Object(Map::new())),
            Value::String(raw) if raw.trim().is_empty() => Ok(Value::Object(Map::new())),
            Value::String(raw) => serde_json::from_str(raw),
            other => Ok(other.clone()),
        }
    }
}

/// Tool descriptor in the catalog sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

/// Function part of a tool descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a function tool definition
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Request to the LLM for completion
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    /// Create a request over the given conversation
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add a user message
    pub fn with_user_message(self, content: impl Into<String>) -> Self {
        self.with_message(Message::user(content))
    }

    /// Attach a tool catalog
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Response from the LLM
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub message: Message,
    pub done_reason: Option<String>,
    pub usage: Usage,
}

impl CompletionResponse {
    /// Plain text answer
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            done_reason: Some("stop".to_string()),
            usage: Usage::default(),
        }
    }

    /// Answer that requests tool invocations
    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            message: Message::assistant_with_tool_calls("", tool_calls),
            done_reason: Some("stop".to_string()),
            usage: Usage::default(),
        }
    }

    /// Assistant text content
    pub fn content(&self) -> &str {
        &self.message.content
    }

    /// Tool invocations requested by the model
    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.message.tool_calls
    }

    /// Check if the response asks for tool execution
    pub fn needs_tool_execution(&self) -> bool {
        self.message.has_tool_calls()
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    /// Create new usage stats
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate usage from another instance
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}
