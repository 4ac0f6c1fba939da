use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PathsConfig {
    /// The JSON document holding the whole product list.
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_web_dir")]
    pub web_dir: String,
    #[serde(default = "default_beep_sound")]
    pub beep_sound: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Frames queued per listener before further events to it are dropped.
    #[serde(default = "default_listener_buffer")]
    pub listener_buffer: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Port with the `PORT` env var taking priority over the config file,
    /// so hosting platforms that assign a port keep working.
    pub fn resolved_port(&self) -> u16 {
        std::env::var("PORT")
            .ok()
            .and_then(|p| p.trim().parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or(self.port)
    }

    /// Full bind address, e.g. `"0.0.0.0:10000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.resolved_port())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            web_dir: default_web_dir(),
            beep_sound: default_beep_sound(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listener_buffer: default_listener_buffer(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    10000
}

pub fn default_data_file() -> String {
    "products.json".to_string()
}

pub fn default_web_dir() -> String {
    "frontend".to_string()
}

pub fn default_beep_sound() -> String {
    "frontend/audio/beep.mp3".to_string()
}

pub fn default_listener_buffer() -> usize {
    64
}
