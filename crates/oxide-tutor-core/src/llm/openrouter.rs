use super::{CompletionProvider, LlmError};
use crate::config::TutorSettings;
use crate::http_utils::{clean_error_body, create_http_client, retry_transient};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Completion provider for the `OpenRouter` chat-completions API
pub struct OpenRouterClient {
    http_client: HttpClient,
    api_key: Option<String>,
    url: String,
    model_id: String,
    max_tokens: u32,
    temperature: f32,
    site_url: String,
    site_name: String,
}

impl OpenRouterClient {
    /// Create a client from settings. A missing key is reported per request.
    #[must_use]
    pub fn new(settings: &TutorSettings) -> Self {
        Self {
            http_client: create_http_client(settings.llm_http_timeout_secs),
            api_key: settings.openrouter_api_key.clone(),
            url: settings.openrouter_api_url.clone(),
            model_id: settings.chat_model_id.clone(),
            max_tokens: settings.chat_max_tokens,
            temperature: settings.chat_temperature,
            site_url: settings.openrouter_site_url.clone(),
            site_name: settings.openrouter_site_name.clone(),
        }
    }

    fn request_body(&self, system_prompt: &str, user_message: &str) -> Value {
        json!({
            "model": self.model_id,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_message}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        })
    }

    async fn send_completion(&self, api_key: &str, body: &Value) -> Result<Value, LlmError> {
        let mut request = self
            .http_client
            .post(&self.url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json");

        if !self.site_url.is_empty() {
            request = request.header("HTTP-Referer", &self.site_url);
        }
        if !self.site_name.is_empty() {
            request = request.header("X-Title", &self.site_name);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: clean_error_body(&error_text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::JsonError(e.to_string()))
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    #[instrument(skip(self, system_prompt, user_message), fields(model = %self.model_id))]
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::MissingConfig("OpenRouter API key".to_string()))?;

        let body = self.request_body(system_prompt, user_message);
        let res_json = retry_transient(
            "openrouter",
            || self.send_completion(api_key, &body),
            LlmError::is_transient,
        )
        .await?;

        let content = extract_text_content(&res_json, &["choices", "0", "message", "content"])?;
        if content.trim().is_empty() {
            return Err(LlmError::ApiError("Empty response".to_string()));
        }
        debug!(reply_chars = content.chars().count(), "Completion received");
        Ok(content)
    }
}

/// Extracts text content from a JSON response by navigating a path.
///
/// Numeric segments index into arrays, everything else is an object key.
///
/// # Errors
///
/// Returns `LlmError::JsonError` if the path is missing or the target is not a
/// string.
///
/// # Examples
///
/// ```
/// use oxide_tutor_core::llm::extract_text_content;
/// use serde_json::json;
///
/// let response = json!({"choices": [{"message": {"content": "Hi!"}}]});
/// let text = extract_text_content(&response, &["choices", "0", "message", "content"]);
/// assert_eq!(text.ok().as_deref(), Some("Hi!"));
/// ```
pub fn extract_text_content(response: &Value, path: &[&str]) -> Result<String, LlmError> {
    let mut current = response;

    for segment in path {
        if let Ok(index) = segment.parse::<usize>() {
            current = current
                .get(index)
                .ok_or_else(|| LlmError::JsonError(format!("missing index {index}")))?;
        } else {
            current = current
                .get(*segment)
                .ok_or_else(|| LlmError::JsonError(format!("missing key '{segment}'")))?;
        }
    }

    current
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| LlmError::JsonError(format!("expected string, got: {current}")))
}
