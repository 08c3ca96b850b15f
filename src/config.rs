use eyre::{Context, Result};
use ollama_tools::llm::OllamaConfig;
use ollama_tools::llm::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub narrate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_ms: 120000,
        }
    }
}

impl LlmConfig {
    pub fn to_ollama_config(&self) -> OllamaConfig {
        OllamaConfig::with_endpoint(&self.endpoint)
            .model(&self.model)
            .timeout(Duration::from_millis(self.timeout_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            narrate: true,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Primary: ~/.config/<project>/<project>.yml, fallback: ./<project>.yml
        let candidates: Vec<PathBuf> = primary_config_path().into_iter().chain([fallback_config_path()]).collect();
        Ok(Self::load_first_of(&candidates))
    }

    /// First candidate that exists and parses; a broken file is skipped with a warning
    fn load_first_of(candidates: &[PathBuf]) -> Self {
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Self::default()
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Command-line values win over file values
    pub fn with_overrides(mut self, endpoint: Option<&str>, model: Option<&str>) -> Self {
        if let Some(endpoint) = endpoint {
            self.llm.endpoint = endpoint.to_string();
        }
        if let Some(model) = model {
            self.llm.model = model.to_string();
        }
        self
    }
}

fn primary_config_path() -> Option<PathBuf> {
    let project_name = env!("CARGO_PKG_NAME");
    dirs::config_dir().map(|dir| dir.join(project_name).join(format!("{}.yml", project_name)))
}

fn fallback_config_path() -> PathBuf {
    PathBuf::from(format!("{}.yml", env!("CARGO_PKG_NAME")))
}
