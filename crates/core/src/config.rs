//! Runtime configuration for the monitor.
//!
//! Loaded from a TOML file; the Telegram token may instead come from the
//! `TELEGRAM_BOT_TOKEN` environment variable so it can stay out of the file.

use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Environment fallback for the bot token.
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level monitor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Network to monitor ("ethereum", "polygon", "arbitrum", "optimism")
    pub network: String,
    /// Wallet addresses to monitor each cycle
    pub addresses: Vec<Address>,
    /// Seconds between cycles
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    /// Concurrent per-address fetches (1 = sequential)
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Notification channel settings
    pub telegram: TelegramConfig,
}

/// Telegram notification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Target chat id
    pub chat_id: String,
    /// Bot token; falls back to the `TELEGRAM_BOT_TOKEN` env var when absent
    #[serde(default)]
    pub token: Option<String>,
}

fn default_update_interval() -> u64 {
    60
}

fn default_max_concurrent_fetches() -> usize {
    1
}

impl MonitorConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        if config.addresses.is_empty() {
            bail!("no addresses configured in {}", path.display());
        }

        Ok(config)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Resolve the bot token from the config file or the environment.
    pub fn telegram_token(&self) -> Result<String> {
        if let Some(token) = &self.telegram.token {
            return Ok(token.clone());
        }
        std::env::var(TOKEN_ENV_VAR).with_context(|| {
            format!("telegram token not in config and {TOKEN_ENV_VAR} is unset")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        network = "ethereum"
        addresses = ["0x00000000000000000000000000000000000000aa"]

        [telegram]
        chat_id = "-100123456"
        token = "123:abc"
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config: MonitorConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.network, "ethereum");
        assert_eq!(config.addresses.len(), 1);
        assert_eq!(config.update_interval_secs, 60);
        assert_eq!(config.max_concurrent_fetches, 1);
        assert_eq!(config.telegram_token().unwrap(), "123:abc");
    }

    #[test]
    fn test_interval_override() {
        let raw = SAMPLE.replace(
            "network = \"ethereum\"",
            "network = \"polygon\"\nupdate_interval_secs = 30",
        );
        let config: MonitorConfig = toml::from_str(&raw).unwrap();
        assert_eq!(config.update_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let raw = SAMPLE.replace("0x00000000000000000000000000000000000000aa", "not-an-address");
        assert!(toml::from_str::<MonitorConfig>(&raw).is_err());
    }
}
