//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - demo: run the three canned exchanges (default)
//! - ask: run one exchange
//! - tools: print the tool catalog
//! - calc: evaluate an expression locally

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ollama-tools - Tool-calling chat driver for Ollama
#[derive(Parser, Debug)]
#[command(name = "ollama-tools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat endpoint URL (overrides config)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Model name (overrides config)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the three demonstration exchanges
    Demo,

    /// Send one message and let the model use tools
    Ask {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Print the tool catalog sent to the model
    Tools,

    /// Evaluate an arithmetic expression with the calculate tool
    Calc {
        /// Expression, e.g. "2 ^ 10"
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        expression: Vec<String>,
    },
}
