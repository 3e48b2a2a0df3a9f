//! `tandem init`: first-time setup.

use std::path::Path;

use tandem_config::AppConfig;

pub fn run(config_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    run_with_env(config_path, force, |key| std::env::var(key).ok())
}

fn run_with_env<F>(config_path: &Path, force: bool, env: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    println!("Tandem: first-time setup");
    println!("========================\n");

    if let Some(dir) = config_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("Edit it manually or re-run with --force.\n");
    } else {
        std::fs::write(config_path, AppConfig::default_toml())?;
        println!("Wrote config: {}", config_path.display());
    }

    // Appends never create directories, so make the memory log's home now
    let mut config = AppConfig::load_from(config_path)?;
    config.apply_env_overrides(env);
    if let Some(dir) = config.memory.path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("Created memory directory: {}", dir.display());
        }
    }

    if !config.has_api_key() {
        println!("\nNext: set OPENAI_API_KEY (or TANDEM_API_KEY), or add api_key to the config.");
    }
    println!("Run `tandem ask \"<question>\"` to start.\n");

    Ok(())
}
