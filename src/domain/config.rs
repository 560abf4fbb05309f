//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file
//! (`config.yaml`). Defines the structs for service credentials and system
//! settings.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Main application configuration structure.
/// Matches the layout of `config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub square: SquareConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

impl AppConfig {
    /// Load the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Configuration for connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub discord: DiscordConfig,
}

/// Specific configuration for the Discord service.
#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    /// Bot token. May be left empty to read `DISCORD_TOKEN` from the
    /// environment instead.
    #[serde(default)]
    pub token: Option<String>,
    /// Guild the slash commands are registered in. The bot is designed to
    /// serve a single server.
    pub guild_id: u64,
    /// Whether this instance is hosted by its own user. When false, `/login`
    /// shows a trust warning before prompting for credentials.
    #[serde(default)]
    pub self_hosted: bool,
    #[serde(default)]
    pub activity: Option<String>,
}

impl DiscordConfig {
    /// Resolve the bot token from the config file or the environment.
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }
        match std::env::var("DISCORD_TOKEN") {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => bail!("no bot token in config and DISCORD_TOKEN is not set"),
        }
    }
}

/// Square Cloud API settings.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct SquareConfig {
    /// Override for the API base URL. Mostly useful for tests.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// System-level settings for the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_locales_dir")]
    pub locales_dir: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            locales_dir: default_locales_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_locales_dir() -> String {
    "locales".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = "
services:
  discord:
    token: abc
    guild_id: 1234
";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.services.discord.guild_id, 1234);
        assert!(!config.services.discord.self_hosted);
        assert_eq!(config.system.data_dir, "data");
        assert_eq!(config.system.locales_dir, "locales");
        assert!(config.square.base_url.is_none());
    }

    #[test]
    fn token_from_config_wins() {
        let discord = DiscordConfig {
            token: Some("from-config".to_string()),
            guild_id: 1,
            self_hosted: false,
            activity: None,
        };
        assert_eq!(discord.resolve_token().unwrap(), "from-config");
    }
}
