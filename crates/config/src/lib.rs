//! Configuration loading, validation, and management for Tandem.
//!
//! Loads configuration from `~/.tandem/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.tandem/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the chat endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens per backend response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Per-stage model selection
    #[serde(default)]
    pub models: ModelsConfig,

    /// Backoff policy for the remote call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Planner/executor limits
    #[serde(default)]
    pub agent: AgentConfig,

    /// Memory log configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_max_output_tokens() -> u32 {
    1024
}
fn default_model() -> String {
    "gpt-4o".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("models", &self.models)
            .field("retry", &self.retry)
            .field("agent", &self.agent)
            .field("memory", &self.memory)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_model")]
    pub planner: String,

    #[serde(default = "default_model")]
    pub executor: String,

    /// Model that distills transcripts into memory lines
    #[serde(default = "default_model")]
    pub memory: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            planner: default_model(),
            executor: default_model(),
            memory: default_model(),
        }
    }
}

/// Exponential backoff: before attempt `n + 1` wait
/// `clamp(multiplier * 2^(n-1), min_delay, max_delay)` seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_multiplier_secs")]
    pub multiplier_secs: f64,

    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: f64,

    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: f64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_multiplier_secs() -> f64 {
    1.0
}
fn default_min_delay_secs() -> f64 {
    2.0
}
fn default_max_delay_secs() -> f64 {
    10.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            multiplier_secs: default_multiplier_secs(),
            min_delay_secs: default_min_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Planning cycles before giving up on a final answer
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    /// Tool-call rounds allowed within one executor cycle
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    /// Role used when none is given on the command line
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_max_cycles() -> u32 {
    5
}
fn default_max_tool_rounds() -> u32 {
    8
}
fn default_role() -> String {
    "assistant".into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_cycles: default_max_cycles(),
            max_tool_rounds: default_max_tool_rounds(),
            role: default_role(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// JSONL memory log; its directory must exist before the first append
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,

    /// Records recalled per forward call
    #[serde(default = "default_recent_k")]
    pub recent_k: usize,
}

fn default_memory_path() -> PathBuf {
    AppConfig::config_dir().join("memory").join("all_memory.jsonl")
}
fn default_recent_k() -> usize {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
            recent_k: default_recent_k(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.tandem/config.toml).
    ///
    /// Environment variables override the file:
    /// - `TANDEM_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `OPENAI_BASE_URL`
    /// - `TANDEM_MEMORY_PATH`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("TANDEM_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }

        if let Some(path) = lookup("TANDEM_MEMORY_PATH") {
            self.memory.path = PathBuf::from(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".tandem")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }

        let delays = [
            ("retry.multiplier_secs", self.retry.multiplier_secs),
            ("retry.min_delay_secs", self.retry.min_delay_secs),
            ("retry.max_delay_secs", self.retry.max_delay_secs),
        ];
        for (name, secs) in delays {
            if !secs.is_finite() || secs < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a finite, non-negative number of seconds"
                )));
            }
        }

        if self.retry.min_delay_secs > self.retry.max_delay_secs {
            return Err(ConfigError::ValidationError(
                "retry.min_delay_secs must not exceed retry.max_delay_secs".into(),
            ));
        }

        if self.agent.max_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_cycles must be at least 1".into(),
            ));
        }

        if self.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_output_tokens must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            max_output_tokens: default_max_output_tokens(),
            models: ModelsConfig::default(),
            retry: RetryConfig::default(),
            agent: AgentConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
