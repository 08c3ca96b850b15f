//! ollama-tools - tool-calling chat driver
//!
//! Sends a user message plus a tool catalog to an Ollama-compatible chat
//! endpoint, runs any tools the model asks for, and feeds the results back
//! for a final answer.

pub mod driver;
pub mod error;
pub mod llm;
pub mod tools;

pub use error::{ChatError, Result};
