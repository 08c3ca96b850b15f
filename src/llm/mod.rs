//! LLM Client Layer - Ollama chat API integration
//!
//! This module provides:
//! - Message and tool types for LLM communication
//! - LlmClient trait for API abstraction
//! - OllamaClient implementation
//! - MockLlmClient for tests

pub mod client;
pub mod ollama;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use ollama::{OllamaClient, OllamaConfig};
pub use types::{
    CompletionRequest, CompletionResponse, FunctionCall, FunctionDefinition, Message, Role, ToolCall, ToolDefinition,
    Usage,
};
