//! Chat driver module - tool-calling exchanges.
//!
//! This module provides:
//! - ChatDriver for running one user message through the model and tools
//! - Exchange records and the exchange state machine
//! - Narration and the canned demonstration

mod demo;
mod exchange;
mod narrate;

pub use demo::{DEMO_PROMPTS, run_demo};
pub use exchange::{ChatDriver, ChatDriverConfig, Exchange, ExchangeState, ToolInvocation};
pub use narrate::Narrator;
