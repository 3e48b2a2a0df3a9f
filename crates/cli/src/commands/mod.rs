pub mod ask;
pub mod init;
pub mod memory;

use std::path::{Path, PathBuf};

use tandem_config::AppConfig;

pub fn default_config_path() -> PathBuf {
    AppConfig::config_dir().join("config.toml")
}

/// Load `path` (defaults if absent) with environment overrides applied.
pub fn load_config(path: &Path) -> Result<AppConfig, Box<dyn std::error::Error>> {
    AppConfig::load_with_env(path).map_err(|e| format!("Failed to load config: {e}").into())
}
