//! Telegram transport settings.

use config::ConfigError;
use oxide_tutor_core::config::TutorSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default route Telegram posts updates to
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";
/// Default listening port
pub const DEFAULT_PORT: u16 = 10_000;
/// Default keep-alive period: 5 minutes
pub const DEFAULT_KEEP_ALIVE_INTERVAL_SECS: u64 = 300;

/// Telegram transport settings loaded from environment variables.
///
/// `TELEGRAM_TOKEN` and `WEBHOOK_BASE_URL` win over their older spellings
/// `BOT_TOKEN` and `WEBHOOK_URL`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramSettings {
    /// Telegram Bot API token.
    pub telegram_token: Option<String>,
    /// Legacy name of the bot token.
    pub bot_token: Option<String>,
    /// Public base URL of this service, e.g. `https://tutor.example.com`.
    pub webhook_base_url: Option<String>,
    /// Legacy full webhook URL; its trailing webhook path is stripped.
    pub webhook_url: Option<String>,
    /// Route Telegram posts updates to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    /// Port the webhook server binds on all interfaces.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between keep-alive pings.
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_secs: u64,
    /// Disable to skip the keep-alive task entirely.
    #[serde(default = "default_true")]
    pub keep_alive_enabled: bool,
}

fn default_webhook_path() -> String {
    DEFAULT_WEBHOOK_PATH.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_keep_alive_interval() -> u64 {
    DEFAULT_KEEP_ALIVE_INTERVAL_SECS
}

const fn default_true() -> bool {
    true
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            telegram_token: None,
            bot_token: None,
            webhook_base_url: None,
            webhook_url: None,
            webhook_path: default_webhook_path(),
            port: DEFAULT_PORT,
            keep_alive_interval_secs: DEFAULT_KEEP_ALIVE_INTERVAL_SECS,
            keep_alive_enabled: true,
        }
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Tutor service settings shared across transport handlers.
    pub tutor: Arc<TutorSettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(tutor: TutorSettings, telegram: TelegramSettings) -> Self {
        Self {
            tutor: Arc::new(tutor),
            telegram: Arc::new(telegram),
        }
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails, the bot token is missing, or
    /// the webhook URL is missing or unparsable.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = oxide_tutor_core::config::build_config()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks everything the webhook host needs at startup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` naming the missing or invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token().is_none() {
            return Err(ConfigError::Message(
                "TELEGRAM_TOKEN (or BOT_TOKEN) is not set".to_string(),
            ));
        }
        self.webhook_endpoint()?;
        Ok(())
    }

    /// Bot token, preferring `TELEGRAM_TOKEN`.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        [&self.telegram_token, &self.bot_token]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Normalized webhook route, always starting with `/`.
    #[must_use]
    pub fn route_path(&self) -> String {
        let trimmed = self.webhook_path.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return DEFAULT_WEBHOOK_PATH.to_string();
        }
        if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Public base URL without a trailing slash or webhook path.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        if let Some(base) = non_empty(self.webhook_base_url.as_deref()) {
            return Some(base.trim_end_matches('/').to_string());
        }
        let full = non_empty(self.webhook_url.as_deref())?.trim_end_matches('/');
        let route = self.route_path();
        let base = full.strip_suffix(route.as_str()).unwrap_or(full);
        Some(base.trim_end_matches('/').to_string())
    }

    /// Full URL registered with Telegram.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Message` if no base URL is configured or the
    /// result does not parse as a URL.
    pub fn webhook_endpoint(&self) -> Result<reqwest::Url, ConfigError> {
        let base = self.base_url().ok_or_else(|| {
            ConfigError::Message("WEBHOOK_BASE_URL (or WEBHOOK_URL) is not set".to_string())
        })?;
        let endpoint = format!("{base}{}", self.route_path());
        reqwest::Url::parse(&endpoint)
            .map_err(|e| ConfigError::Message(format!("invalid webhook URL '{endpoint}': {e}")))
    }

    /// URL the keep-alive task pings: the service root.
    #[must_use]
    pub fn keep_alive_url(&self) -> Option<String> {
        self.base_url().map(|base| format!("{base}/"))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
