use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
mod types;

pub use types::*;

pub fn load_user_config() -> Result<Config> {
    let config_dir = get_config_directory()?;
    let config_file_path = config_dir.join("config.toml");

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

    if !config_file_path.exists() {
        create_default_config(&config_file_path)?;
    }

    let config_content = fs::read_to_string(&config_file_path)
        .with_context(|| format!("Failed to read config file: {:?}", config_file_path))?;

    let config: Result<Config, toml::de::Error> = toml::from_str(&config_content);
    match config {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            // Parse failure: back up the broken file and start over with defaults.
            let bak_path = config_file_path.with_extension("bak");
            fs::rename(&config_file_path, &bak_path)
                .with_context(|| format!("Failed to backup old config to {:?}", bak_path))?;
            create_default_config(&config_file_path)?;
            let config_content = fs::read_to_string(&config_file_path).with_context(|| {
                format!("Failed to read new config file: {:?}", config_file_path)
            })?;
            let config: Config = toml::from_str(&config_content)
                .with_context(|| "Failed to parse new config file")?;
            log::warn!(
                "Config parse error: {}. Old config has been backed up to {:?}, new config created.",
                e,
                bak_path
            );
            Ok(config)
        }
    }
}

/// Path of the user config file; the runtime watches its mtime to pick up
/// settings changes without a restart.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(get_config_directory()?.join("config.toml"))
}

fn get_config_directory() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // Windows: %LOCALAPPDATA%\ReplayXtender
        if let Some(local_appdata) = std::env::var_os("LOCALAPPDATA") {
            Ok(PathBuf::from(local_appdata).join("ReplayXtender"))
        } else {
            anyhow::bail!("LOCALAPPDATA environment variable not found")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        dirs::config_dir()
            .map(|d| d.join("replay-xtender"))
            .context("Could not determine config directory")
    }
}

fn create_default_config(config_path: &PathBuf) -> Result<()> {
    let default_cfg = Config {
        replay: Replay::default(),
        watcher: Watcher::default(),
    };
    let default_content = toml::to_string_pretty(&default_cfg)
        .map_err(|e| anyhow::anyhow!("Failed to serialize default config: {}", e))?;
    fs::write(config_path, default_content)
        .with_context(|| format!("Failed to write default config to {:?}", config_path))?;
    log::info!("Created default config file at: {:?}", config_path);
    Ok(())
}
