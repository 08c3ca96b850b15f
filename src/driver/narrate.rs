//! Progress narration on stdout

use colored::*;
use serde_json::Value;

use super::exchange::format_arguments;

const RULE_WIDTH: usize = 60;

/// Prints what an exchange is doing. Purely observational.
#[derive(Debug, Clone, Copy)]
pub struct Narrator {
    enabled: bool,
}

impl Narrator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn user(&self, text: &str) {
        if self.enabled {
            println!("{} {}\n", "User:".bold(), text);
        }
    }

    pub fn calling_tools(&self) {
        if self.enabled {
            println!("{}\n", "Model is calling tools...".yellow());
        }
    }

    pub fn tool_call(&self, name: &str, arguments: &Value) {
        if self.enabled {
            println!("{} {}({})", "Calling:".cyan(), name, format_arguments(arguments));
        }
    }

    pub fn tool_result(&self, content: &str) {
        if self.enabled {
            println!("{} {}\n", "Result:".cyan(), content);
        }
    }

    pub fn answer(&self, text: &str) {
        if self.enabled {
            println!("{} {}\n", "Assistant:".green().bold(), text);
        }
    }

    /// Heavy rule with a title, for demo start and end
    pub fn banner(&self, title: &str) {
        if self.enabled {
            let rule = "=".repeat(RULE_WIDTH);
            println!("{}\n{}\n{}", rule, title.bold(), rule);
        }
    }

    /// Light rule under a section title
    pub fn section(&self, title: &str) {
        if self.enabled {
            println!("\n{}\n{}", title.bold(), "-".repeat(RULE_WIDTH));
        }
    }
}
