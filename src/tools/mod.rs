//! Tool system for LLM interactions
//!
//! The set of callable tools is closed: every tool is a [`ToolKind`] variant
//! with a wire name, a description and a parameter schema. The
//! [`ToolRegistry`] maps names requested by the model back to variants.

mod calculate;
mod current_time;
pub mod expr;
mod registry;

pub use expr::{EvalError, evaluate};
pub use registry::ToolRegistry;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::llm::ToolDefinition;

/// A tool the model may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    CurrentTime,
    Calculate,
}

impl ToolKind {
    /// Every tool, in catalog order
    pub const ALL: [ToolKind; 2] = [ToolKind::CurrentTime, ToolKind::Calculate];

    /// Tool name (matches the function name the model sends back)
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::CurrentTime => current_time::NAME,
            ToolKind::Calculate => calculate::NAME,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::CurrentTime => current_time::DESCRIPTION,
            ToolKind::Calculate => calculate::DESCRIPTION,
        }
    }

    /// JSON Schema for input parameters
    pub fn parameters(&self) -> Value {
        match self {
            ToolKind::CurrentTime => current_time::parameters(),
            ToolKind::Calculate => calculate::parameters(),
        }
    }

    /// Catalog entry for the chat API
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }

    /// Bind named arguments and run the tool
    pub fn run(&self, arguments: Value) -> ToolResult {
        let result = match self {
            ToolKind::CurrentTime => bind(arguments).map(current_time::run),
            ToolKind::Calculate => bind(arguments).map(calculate::run),
        };

        result.unwrap_or_else(|e| ToolResult::error(format!("Invalid arguments for {}: {}", self.name(), e)))
    }
}

fn bind<A: DeserializeOwned>(arguments: Value) -> serde_json::Result<A> {
    serde_json::from_value(arguments)
}

/// Result from tool execution: result fields, or a lone `error` field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolResult {
    fields: Map<String, Value>,
}

impl ToolResult {
    pub fn success(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(message.into()));
        Self { fields }
    }

    pub fn is_error(&self) -> bool {
        self.fields.contains_key("error")
    }

    /// Error message, if this is an error result
    pub fn error_message(&self) -> Option<&str> {
        self.fields.get("error").and_then(|v| v.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Serialized form appended to the conversation as a `tool` message
    pub fn to_content(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}
