use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{load_config, resolve_config_file};
use crate::ui::print_success;
use posture_coach::Config;

pub async fn show_config(explicit: Option<&Path>) -> Result<()> {
    let config = load_config(explicit)?;
    let config_str = config.to_toml_string()?;

    println!("Current Configuration");
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);

    Ok(())
}

pub async fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let config_file = resolve_config_file(explicit)?;

    if config_file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            config_file.display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default()
        .save(&config_file)
        .with_context(|| format!("Failed to write {}", config_file.display()))?;

    print_success(&format!("Configuration initialized at: {}", config_file.display()));

    Ok(())
}

pub async fn print_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", resolve_config_file(explicit)?.display());
    Ok(())
}
