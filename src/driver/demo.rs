//! Canned demonstration: three exchanges run back to back

use super::exchange::{ChatDriver, Exchange};
use crate::error::Result;
use crate::llm::LlmClient;

/// Titles and prompts of the demonstration exchanges
pub const DEMO_PROMPTS: [(&str, &str); 3] = [
    ("Example 1: Ask for current time", "What's the current time?"),
    ("Example 2: Ask for calculation", "What is 123 * 456?"),
    (
        "Example 3: Combined query",
        "What time is it and what is 2 to the power of 10?",
    ),
];

/// Run every demonstration prompt in order; stops at the first failure.
pub async fn run_demo<L: LlmClient>(driver: &ChatDriver<L>) -> Result<Vec<Exchange>> {
    let narrator = driver.narrator();
    narrator.banner("Ollama Tool Use Demo");

    let mut exchanges = Vec::with_capacity(DEMO_PROMPTS.len());
    for (title, prompt) in DEMO_PROMPTS {
        narrator.section(title);
        exchanges.push(driver.run_exchange(prompt).await?);
    }

    narrator.banner("Demo complete!");
    Ok(exchanges)
}
