//! Tool registry - maps requested tool names to tools and runs them

use std::collections::HashMap;

use super::{ToolKind, ToolResult};
use crate::llm::{ToolCall, ToolDefinition};

/// Tools available to one exchange
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolKind>,
    order: Vec<ToolKind>,
}

impl ToolRegistry {
    /// Create registry with every known tool
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in ToolKind::ALL {
            registry.register(kind);
        }
        registry
    }

    /// Create an empty registry (for custom tool sets)
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a tool; returns false if its name is already taken
    pub fn register(&mut self, kind: ToolKind) -> bool {
        if self.tools.contains_key(kind.name()) {
            log::warn!("Tool '{}' already registered", kind.name());
            return false;
        }
        self.tools.insert(kind.name(), kind);
        self.order.push(kind);
        true
    }

    /// Tool catalog for the chat API, in registration order
    pub fn catalog(&self) -> Vec<ToolDefinition> {
        self.order.iter().map(ToolKind::definition).collect()
    }

    /// Resolve and run one tool invocation. Never fails: unknown names and
    /// bad arguments come back as `error` results for the model to read.
    pub fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(kind) = self.tools.get(call.name()) else {
            tracing::warn!(tool = %call.name(), "Unknown tool requested");
            return ToolResult::error(format!("Unknown function: {}", call.name()));
        };

        let arguments = match call.arguments() {
            Ok(arguments) => arguments,
            Err(e) => {
                tracing::warn!(tool = %call.name(), error = %e, "Undecodable tool arguments");
                return ToolResult::error(format!("Invalid arguments for {}: {}", call.name(), e));
            }
        };

        tracing::debug!(tool = %call.name(), arguments = %arguments, "Dispatching tool call");
        let result = kind.run(arguments);
        tracing::debug!(tool = %call.name(), is_error = result.is_error(), "Tool finished");
        result
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the list of tool names, in registration order
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.order.iter().map(ToolKind::name).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
