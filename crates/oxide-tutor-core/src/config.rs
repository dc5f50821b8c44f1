//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the defaults for both downstream APIs.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

pub use config::ConfigError;

/// OpenRouter chat-completions endpoint
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// Default completion model
pub const DEFAULT_CHAT_MODEL: &str = "mistralai/mistral-7b-instruct:free";
/// Default completion length limit
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 300;
/// Default sampling temperature
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.7;

/// Public LanguageTool check endpoint
pub const LANGUAGETOOL_API_URL: &str = "https://api.languagetool.org/v2/check";
/// Language sent with every grammar check
pub const LANGUAGETOOL_LANGUAGE: &str = "en-US";

/// Timeout for completion requests, in seconds
pub const LLM_HTTP_TIMEOUT_SECS: u64 = 60;
/// Timeout for grammar-check requests, in seconds
pub const GRAMMAR_HTTP_TIMEOUT_SECS: u64 = 15;

/// Retries after the first failed attempt of an outbound call
pub const OUTBOUND_MAX_RETRIES: usize = 1;
/// Base delay before the retry (jittered)
pub const OUTBOUND_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for the retry delay
pub const OUTBOUND_MAX_BACKOFF_MS: u64 = 2000;

/// Builds the layered configuration shared by every settings struct.
///
/// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
/// `config/local`, `APP__*` environment variables, then plain environment
/// variables (`OPENROUTER_API_KEY` maps to `openrouter_api_key`).
///
/// # Errors
///
/// Returns a `ConfigError` if a present file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Local overrides, never checked in
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        // ignore_empty treats empty env vars as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Settings for the tutor services (completion + grammar clients, sessions)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TutorSettings {
    /// `OpenRouter` API key. Absence is reported to the user, not fatal.
    pub openrouter_api_key: Option<String>,
    /// Chat-completions endpoint
    #[serde(default = "default_openrouter_api_url")]
    pub openrouter_api_url: String,
    /// Model identifier sent to `OpenRouter`
    #[serde(default = "default_chat_model")]
    pub chat_model_id: String,
    /// `max_tokens` for completions
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    /// Sampling temperature for completions
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
    /// Site URL for `OpenRouter` identification
    #[serde(default)]
    pub openrouter_site_url: String,
    /// Site name for `OpenRouter` identification
    #[serde(default = "default_openrouter_site_name")]
    pub openrouter_site_name: String,

    /// Grammar-check endpoint
    #[serde(default = "default_languagetool_url")]
    pub languagetool_url: String,
    /// Language code sent to the grammar checker
    #[serde(default = "default_languagetool_language")]
    pub languagetool_language: String,

    /// Completion request timeout (seconds)
    #[serde(default = "default_llm_timeout")]
    pub llm_http_timeout_secs: u64,
    /// Grammar-check request timeout (seconds)
    #[serde(default = "default_grammar_timeout")]
    pub grammar_http_timeout_secs: u64,

    /// Optional upper bound on remembered chats; unbounded when unset
    pub session_max_entries: Option<u64>,
}

fn default_openrouter_api_url() -> String {
    OPENROUTER_API_URL.to_string()
}

fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}

const fn default_chat_max_tokens() -> u32 {
    DEFAULT_CHAT_MAX_TOKENS
}

const fn default_chat_temperature() -> f32 {
    DEFAULT_CHAT_TEMPERATURE
}

fn default_openrouter_site_name() -> String {
    "Oxide Tutor TG Bot".to_string()
}

fn default_languagetool_url() -> String {
    LANGUAGETOOL_API_URL.to_string()
}

fn default_languagetool_language() -> String {
    LANGUAGETOOL_LANGUAGE.to_string()
}

const fn default_llm_timeout() -> u64 {
    LLM_HTTP_TIMEOUT_SECS
}

const fn default_grammar_timeout() -> u64 {
    GRAMMAR_HTTP_TIMEOUT_SECS
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            openrouter_api_url: default_openrouter_api_url(),
            chat_model_id: default_chat_model(),
            chat_max_tokens: DEFAULT_CHAT_MAX_TOKENS,
            chat_temperature: DEFAULT_CHAT_TEMPERATURE,
            openrouter_site_url: String::new(),
            openrouter_site_name: default_openrouter_site_name(),
            languagetool_url: default_languagetool_url(),
            languagetool_language: default_languagetool_language(),
            llm_http_timeout_secs: LLM_HTTP_TIMEOUT_SECS,
            grammar_http_timeout_secs: GRAMMAR_HTTP_TIMEOUT_SECS,
            session_max_entries: None,
        }
    }
}

impl TutorSettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let mut settings: Self = build_config()?.try_deserialize()?;

        // An empty key in a config file counts as unset
        if settings
            .openrouter_api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            settings.openrouter_api_key = None;
        }

        Ok(settings)
    }

    /// Returns true if a completion API key is configured.
    #[must_use]
    pub fn has_openrouter_key(&self) -> bool {
        self.openrouter_api_key.is_some()
    }
}
