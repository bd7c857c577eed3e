// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server configuration, stored as TOML

use crate::registry::{DEFAULT_ID_LENGTH, MIN_ID_LENGTH};
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use ingo_core::validate_board_size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Board size the CLI starts a match with when `--size` is not given
    #[serde(default = "default_board_size")]
    pub default_board_size: u8,
    /// Length of generated match ids
    #[serde(default = "default_match_id_length")]
    pub match_id_length: usize,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_board_size() -> u8 {
    19
}

fn default_match_id_length() -> usize {
    DEFAULT_ID_LENGTH
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_board_size: default_board_size(),
            match_id_length: default_match_id_length(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        validate_board_size(self.default_board_size)
            .context("default_board_size must be 9, 13 or 19")?;
        if self.match_id_length < MIN_ID_LENGTH {
            bail!("match_id_length must be at least {}", MIN_ID_LENGTH);
        }
        Ok(())
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs =
        ProjectDirs::from("io", "ingo", "ingo").context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Load the config from the default location, creating it on first use
pub fn load_config() -> Result<ServerConfig> {
    let config_path = get_config_path().context("Failed to determine config path")?;
    load_config_from(&config_path)
}

/// Load the config from `config_path`, writing defaults there if it does not exist
pub fn load_config_from(config_path: &Path) -> Result<ServerConfig> {
    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default at: {}",
            config_path.display()
        );
        let default_config = ServerConfig::default();
        save_config_to(&default_config, config_path)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config = toml::from_str::<ServerConfig>(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", config_path.display()))?;
    Ok(config)
}

pub fn save_config_to(config: &ServerConfig, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let toml_content = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(config_path, toml_content)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    tracing::info!("Saved config to: {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.default_board_size, 19);
        assert_eq!(config.match_id_length, 6);
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ServerConfig = toml::from_str("default_board_size = 9").unwrap();
        assert_eq!(config.default_board_size, 9);
        assert_eq!(config.match_id_length, 6);
    }

    #[test]
    fn test_load_creates_default_file() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = load_config_from(&config_path)?;
        assert_eq!(config, ServerConfig::default());
        assert!(config_path.exists());

        let reloaded = load_config_from(&config_path)?;
        assert_eq!(reloaded, config);
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");

        let config = ServerConfig {
            default_board_size: 13,
            match_id_length: 8,
            log_filter: "ingo_network=debug".to_string(),
        };
        save_config_to(&config, &config_path)?;
        assert_eq!(load_config_from(&config_path)?, config);
        Ok(())
    }

    #[test]
    fn test_short_match_ids_are_rejected() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "match_id_length = 1\n")?;
        assert!(load_config_from(&config_path).is_err());

        fs::write(&config_path, "match_id_length = 4\n")?;
        assert_eq!(load_config_from(&config_path)?.match_id_length, 4);
        Ok(())
    }

    #[test]
    fn test_invalid_size_is_rejected() -> Result<()> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "default_board_size = 12\n")?;

        assert!(load_config_from(&config_path).is_err());
        Ok(())
    }
}
