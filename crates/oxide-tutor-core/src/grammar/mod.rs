//! Grammar checking
//!
//! Thin client for the LanguageTool `/v2/check` endpoint plus the chat report
//! built from its findings.

/// Chat report formatting for grammar findings
pub mod report;

use crate::config::TutorSettings;
use crate::http_utils::{
    clean_error_body, create_http_client, is_transient_status, retry_transient,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors returned by the grammar checker
#[derive(Debug, Error)]
pub enum GrammarError {
    /// Connection, timeout or body read failure
    #[error("Network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("LanguageTool error {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Cleaned response body
        body: String,
    },
    /// Body is not the expected JSON shape
    #[error("Error parsing response: {0}")]
    Parse(String),
}

impl GrammarError {
    /// Whether one more attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status, .. } => is_transient_status(*status),
            Self::Parse(_) => false,
        }
    }
}

/// Suggested replacement for a flagged span
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    /// Replacement text
    pub value: String,
}

/// One finding reported by the grammar checker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrammarMatch {
    /// Start of the flagged span, in characters
    pub offset: usize,
    /// Length of the flagged span, in characters
    pub length: usize,
    /// Human-readable explanation
    pub message: String,
    /// Suggested replacements, best first
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

impl GrammarMatch {
    /// Builds a match by hand.
    #[must_use]
    pub fn new(offset: usize, length: usize, message: &str, replacements: &[&str]) -> Self {
        Self {
            offset,
            length,
            message: message.to_string(),
            replacements: replacements
                .iter()
                .map(|value| Replacement {
                    value: (*value).to_string(),
                })
                .collect(),
        }
    }

    /// Best suggested replacement, if any.
    #[must_use]
    pub fn first_replacement(&self) -> Option<&str> {
        self.replacements.first().map(|r| r.value.as_str())
    }
}

#[derive(Deserialize)]
struct CheckResponse {
    matches: Vec<GrammarMatch>,
}

/// Parses a `/v2/check` response body.
///
/// Only `matches` is read; every other field of the response is ignored.
///
/// # Errors
///
/// Returns `GrammarError::Parse` when the body is not JSON or has no
/// `matches` array.
pub fn parse_check_response(body: &str) -> Result<Vec<GrammarMatch>, GrammarError> {
    serde_json::from_str::<CheckResponse>(body)
        .map(|response| response.matches)
        .map_err(|e| GrammarError::Parse(e.to_string()))
}

/// Interface for grammar checkers
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    /// Check `text` and return every finding, in checker order
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>, GrammarError>;
}

/// LanguageTool HTTP client
pub struct LanguageToolClient {
    http_client: HttpClient,
    url: String,
    language: String,
}

impl LanguageToolClient {
    /// Create a client from settings
    #[must_use]
    pub fn new(settings: &TutorSettings) -> Self {
        Self {
            http_client: create_http_client(settings.grammar_http_timeout_secs),
            url: settings.languagetool_url.clone(),
            language: settings.languagetool_language.clone(),
        }
    }

    async fn send_check(&self, text: &str) -> Result<String, GrammarError> {
        let response = self
            .http_client
            .post(&self.url)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| GrammarError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GrammarError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GrammarError::Status {
                status: status.as_u16(),
                body: clean_error_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolClient {
    #[instrument(skip(self, text), fields(text_chars = text.chars().count()))]
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>, GrammarError> {
        let body = retry_transient(
            "languagetool",
            || self.send_check(text),
            GrammarError::is_transient,
        )
        .await?;

        let matches = parse_check_response(&body)?;
        debug!(matches = matches.len(), "Grammar check finished");
        Ok(matches)
    }
}
