//! Chat-completion providers
//!
//! One provider today (`OpenRouter`), behind a trait so the relay can be
//! driven by mocks.

mod openrouter;

pub use openrouter::{extract_text_content, OpenRouterClient};

use crate::http_utils::is_transient_status;
use thiserror::Error;

/// Errors that can occur during completion requests
#[derive(Debug, Error)]
pub enum LlmError {
    /// Non-success HTTP status with the (cleaned) response body
    #[error("Error {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
    /// Error during network communication
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Response is not JSON or lacks the expected fields
    #[error("Error parsing response: {0}")]
    JsonError(String),
    /// Missing provider configuration or API key
    #[error("Error: {0} not found.")]
    MissingConfig(String),
    /// Well-formed response without usable content
    #[error("API error: {0}")]
    ApiError(String),
}

impl LlmError {
    /// Whether one more attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::Status { status, .. } => is_transient_status(*status),
            Self::JsonError(_) | Self::MissingConfig(_) | Self::ApiError(_) => false,
        }
    }
}

/// Interface for completion providers
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single-turn completion for `user_message` under `system_prompt`
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_user_facing() {
        let missing = LlmError::MissingConfig("OpenRouter API key".to_string());
        assert_eq!(missing.to_string(), "Error: OpenRouter API key not found.");

        let status = LlmError::Status {
            status: 402,
            body: "{\"error\":\"Insufficient credits\"}".to_string(),
        };
        assert_eq!(status.to_string(), "Error 402: {\"error\":\"Insufficient credits\"}");
        assert!(!status.is_transient());
        assert!(LlmError::Status { status: 502, body: String::new() }.is_transient());
        assert!(!missing.is_transient());
    }
}
