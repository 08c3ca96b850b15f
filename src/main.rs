use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;
use ollama_tools::driver::{ChatDriver, ChatDriverConfig, run_demo};
use ollama_tools::llm::{LlmClient, OllamaClient, ToolCall};
use ollama_tools::tools::ToolRegistry;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ollama-tools")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("ollama-tools.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_client(config: &Config) -> Result<Arc<OllamaClient>> {
    let client = OllamaClient::new(config.llm.to_ollama_config()).context("Failed to create chat client")?;
    info!("Using endpoint {} with model {}", client.endpoint(), client.model());
    Ok(Arc::new(client))
}

fn build_driver(client: Arc<OllamaClient>, config: &Config) -> ChatDriver<OllamaClient> {
    ChatDriver::with_config(
        client,
        ToolRegistry::standard(),
        ChatDriverConfig {
            narrate: config.narrate,
        },
    )
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!(
            "{} {} ({})",
            "Endpoint:".yellow(),
            config.llm.endpoint,
            config.llm.model
        );
    }

    let verbose = cli.is_verbose();
    match &cli.command {
        None | Some(Commands::Demo) => handle_demo_command(config, verbose).await,
        Some(Commands::Ask { message }) => handle_ask_command(&message.join(" "), config, verbose).await,
        Some(Commands::Tools) => handle_tools_command(),
        Some(Commands::Calc { expression }) => handle_calc_command(&expression.join(" ")),
    }
}

async fn handle_demo_command(config: &Config, verbose: bool) -> Result<()> {
    let client = build_client(config)?;
    let driver = build_driver(client.clone(), config);
    let exchanges = run_demo(&driver).await.context("Demo exchange failed")?;

    let usage = client.total_usage();
    info!("Demo finished: {} exchanges, {} tokens", exchanges.len(), usage.total());
    if verbose {
        println!(
            "{} {} in, {} out ({} total)",
            "Tokens:".yellow(),
            usage.input_tokens,
            usage.output_tokens,
            usage.total()
        );
    }
    Ok(())
}

async fn handle_ask_command(message: &str, config: &Config, verbose: bool) -> Result<()> {
    let driver = build_driver(build_client(config)?, config);
    let exchange = driver.run_exchange(message).await.context("Exchange failed")?;

    // Narration already printed the answer
    if !driver.narrator().is_enabled() {
        println!("{}", exchange.answer());
    }

    if verbose {
        println!(
            "{} {} tokens, tools used: {}, done: {}",
            format!("[{}]", exchange.model).yellow(),
            exchange.usage.total(),
            if exchange.used_tools() { "yes" } else { "no" },
            exchange.done_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(())
}

fn handle_tools_command() -> Result<()> {
    let catalog = ToolRegistry::standard().catalog();
    let json = serde_json::to_string_pretty(&catalog).context("Failed to serialize tool catalog")?;
    println!("{}", json);
    Ok(())
}

fn handle_calc_command(expression: &str) -> Result<()> {
    let call = ToolCall::new("calculate", serde_json::json!({ "expression": expression }));
    let result = ToolRegistry::standard().dispatch(&call);

    if result.is_error() {
        println!("{} {}", "Error:".red(), result.to_content());
    } else {
        println!("{}", result.to_content());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_overrides(cli.endpoint.as_deref(), cli.model.as_deref());

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
