use serde::Deserialize;
use thiserror::Error;

use crate::maker::TokenBackend;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("access_token_duration must be positive")]
    NonPositiveDuration,
    #[error("access_token_duration is too large")]
    DurationOutOfRange
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub api_base_path: String,
    pub listen_ip: String,
    pub listen_port: u16,
    #[serde(default)]
    pub token_backend: TokenBackend,
    pub token_symmetric_key: String,
    // seconds
    pub access_token_duration: i64,
    pub auth_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub log_dir: Option<String>
}

impl Config {
    pub fn access_token_duration(
        &self
    ) -> Result<chrono::Duration, ConfigError>
    {
        match self.access_token_duration {
            secs if secs > 0 => chrono::Duration::try_seconds(secs)
                .ok_or(ConfigError::DurationOutOfRange),
            _ => Err(ConfigError::NonPositiveDuration)
        }
    }
}
