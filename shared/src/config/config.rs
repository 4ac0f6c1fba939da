use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::types::server_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

/// Like [`load_config`], but a missing file yields the built-in defaults.
/// A file that exists and is broken is still an error.
pub fn load_config_or_default(path: &str) -> Result<AppConfig, ConfigError> {
    if !Path::new(path).exists() {
        warn!("No configuration at {}, using defaults", path);
        let config = AppConfig::default();
        validate_config(&config)?;
        return Ok(config);
    }
    load_config(path)
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.paths.data_file.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "data_file cannot be empty".into(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::InvalidConfig(
            "port must be greater than 0".into(),
        ));
    }

    if config.hub.listener_buffer == 0 {
        return Err(ConfigError::InvalidConfig(
            "listener_buffer must be greater than 0".into(),
        ));
    }

    Ok(())
}
