mod channels;
mod defaults;
mod prompts;
mod providers;


pub use channels::*;
pub use prompts::*;
pub use providers::*;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::SigmaError;
use defaults::*;

/// Environment variables that override file configuration.
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_ALLOWED_USERS: &str = "ALLOWED_USERS";
pub const ENV_PORT: &str = "PORT";
pub const ENV_PROMPTS: &str = "SIGMA_PROMPTS";

/// Top-level Sigma configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sigma: SigmaConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigmaConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for a daily-rotated log file. Unset = stderr only.
    #[serde(default)]
    pub log_dir: Option<String>,
    /// Path to a TOML file overriding prompt templates and reply texts.
    #[serde(default)]
    pub prompts_path: Option<String>,
}

impl Default for SigmaConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            log_dir: None,
            prompts_path: None,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Message sent to unauthorized users.
    #[serde(default = "default_deny_message")]
    pub deny_message: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            deny_message: default_deny_message(),
        }
    }
}

/// Liveness endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_health_host")]
    pub host: String,
    #[serde(default = "default_health_port")]
    pub port: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_health_host(),
            port: default_health_port(),
        }
    }
}

/// Position-sizing settings for the risk fast path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of the balance risked per trade (0.01 = 1%).
    #[serde(default = "default_risk_fraction")]
    pub fraction: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            fraction: default_risk_fraction(),
        }
    }
}

impl Config {
    /// Apply overrides from the environment (or any lookup, for tests).
    ///
    /// Non-empty variables win over file values. A malformed `PORT` is
    /// ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TELEGRAM_TOKEN) {
            self.channel.telegram.bot_token = token.trim().to_string();
        }
        if let Some(key) = get(ENV_GEMINI_API_KEY) {
            self.provider.gemini.api_key = key.trim().to_string();
        }
        if let Some(model) = get(ENV_GEMINI_MODEL) {
            self.provider.gemini.model = model.trim().to_string();
        }
        if let Some(raw) = get(ENV_ALLOWED_USERS) {
            self.channel.telegram.allowed_users = parse_allowed_users(&raw);
        }
        if let Some(raw) = get(ENV_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.health.port = port,
                Err(e) => warn!("ignoring invalid {ENV_PORT} '{raw}': {e}"),
            }
        }
        if let Some(path) = get(ENV_PROMPTS) {
            self.sigma.prompts_path = Some(path);
        }
    }

    /// Reject configurations the process cannot run with.
    ///
    /// Missing credentials are fatal. An empty allow-list is not: the bot
    /// starts and denies everyone.
    pub fn validate(&self) -> Result<(), SigmaError> {
        if self.channel.telegram.bot_token.is_empty() {
            return Err(SigmaError::Config(format!(
                "Telegram bot token is empty. Set channel.telegram.bot_token or {ENV_TELEGRAM_TOKEN}."
            )));
        }
        if self.provider.gemini.api_key.is_empty() {
            return Err(SigmaError::Config(format!(
                "Gemini API key is empty. Set provider.gemini.api_key or {ENV_GEMINI_API_KEY}."
            )));
        }
        if self.provider.gemini.timeout_secs == 0 {
            return Err(SigmaError::Config(
                "provider.gemini.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.channel.telegram.allowed_users.is_empty() {
            warn!("no authorized users configured ({ENV_ALLOWED_USERS}); all senders will be denied");
        }
        Ok(())
    }
}

/// Parse a comma-separated list of sender ids, skipping malformed entries.
pub fn parse_allowed_users(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("ignoring invalid user id '{s}' in {ENV_ALLOWED_USERS}: {e}");
                None
            }
        })
        .collect()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, SigmaError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| SigmaError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| SigmaError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}

/// Load the file, then layer process environment on top.
pub fn load_with_env(path: &str) -> Result<Config, SigmaError> {
    let mut config = load(path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}
