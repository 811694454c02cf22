// Конфигурация приложения
// В release логирование по умолчанию приглушено до warn

use crate::peer::token::TokenFormat;
use crate::peer::types::{IceServerConfig, ServerKind};
use std::time::Duration;
use thiserror::Error;

#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: &str = "info"; // В режиме отладки логирование включено

#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: &str = "warn";

pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
];

pub const DEFAULT_GATHER_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LABEL: &str = "chat";
pub const DEFAULT_GREETING: &str = "Hello from Rust";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ICE server URL cannot be empty")]
    EmptyUrl,

    #[error("TURN server {0} requires username and credential")]
    MissingTurnCredentials(String),

    #[error("data channel label cannot be empty")]
    EmptyLabel,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub ice_servers: Vec<IceServerConfig>,
    /// Сколько ждём окончания сбора ICE, прежде чем отдать то, что есть
    pub gather_timeout: Duration,
    pub data_channel_label: String,
    /// Что отправить в канал сразу после открытия
    pub greeting: Option<String>,
    pub token_format: TokenFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            gather_timeout: DEFAULT_GATHER_TIMEOUT,
            data_channel_label: DEFAULT_LABEL.into(),
            greeting: Some(DEFAULT_GREETING.into()),
            token_format: TokenFormat::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for server in &self.ice_servers {
            if server.url.trim().is_empty() {
                return Err(ConfigError::EmptyUrl);
            }

            if server.kind == ServerKind::Turn
                && (server.username.is_none() || server.credential.is_none())
            {
                return Err(ConfigError::MissingTurnCredentials(server.url.clone()));
            }
        }

        if self.data_channel_label.is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        Ok(())
    }
}

pub fn default_ice_servers() -> Vec<IceServerConfig> {
    DEFAULT_STUN_SERVERS
        .iter()
        .map(|url| IceServerConfig::stun(*url))
        .collect()
}
