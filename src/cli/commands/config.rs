//! Config command implementation.
//!
//! View and create viewer configuration.

use crate::cli::{Cli, ConfigAction, ConfigArgs, OutputFormat};
use crate::config::{default_config_path, Config};
use crate::error::{Result, ViewerError};

use super::{get_chat_dir, load_config};

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_config_path(),
        ConfigAction::Init => init_config(),
    }
}

/// Show the configuration in effect for the export root.
fn show_config(cli: &Cli) -> Result<()> {
    let config = match get_chat_dir(cli) {
        Ok(dir) => load_config(cli, &dir)?,
        Err(_) => Config::load()?,
    };

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        _ => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| ViewerError::config(format!("Failed to serialize config: {e}")))?;
            print!("{text}");
        }
    }

    Ok(())
}

/// Show configuration file path.
fn show_config_path() -> Result<()> {
    let path = default_config_path()?;
    println!("{}", path.display());
    Ok(())
}

/// Initialize configuration file with defaults.
fn init_config() -> Result<()> {
    let path = default_config_path()?;

    if path.exists() {
        println!("Configuration file already exists at: {}", path.display());
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("Created configuration file at: {}", path.display());
    Ok(())
}
