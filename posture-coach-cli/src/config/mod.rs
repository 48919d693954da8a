use anyhow::{Context, Result};
use posture_coach::Config;
use std::path::{Path, PathBuf};

/// Get config directory path (~/.posture-coach/)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".posture-coach"))
}

/// Get default config file path (~/.posture-coach/config.toml)
pub fn default_config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Explicit path from `--config` / `POSTURE_COACH_CONFIG`, else the default
pub fn resolve_config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_file(),
    }
}

/// Load configuration, falling back to defaults when the file is missing
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = resolve_config_file(explicit)?;
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}
