//! CLI module for ollama-tools - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
