//! Ollama backend.
//!
//! Talks to the non-streaming `/api/chat` endpoint of a local Ollama server
//! and asks for JSON-formatted output.

use super::{
    factory::ProviderFactory, url_origin, validate_http_url, ChatMessage, CompletionConfig,
    CompletionResponse, LlmProvider, ProviderError, DEFAULT_OLLAMA_URL,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;

/// Ollama chat backend.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a backend for the given chat endpoint.
    pub fn new(url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from JSON configuration. `url` defaults to the local server.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        Self::new(config["url"].as_str().unwrap_or(DEFAULT_OLLAMA_URL))
    }

    /// The chat endpoint this backend posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u32>,
}

fn request_body<'a>(messages: &'a [ChatMessage], config: &'a CompletionConfig) -> OllamaChatRequest<'a> {
    OllamaChatRequest {
        model: &config.model,
        messages,
        stream: false,
        format: "json",
        options: OllamaOptions {
            temperature: config.temperature,
            num_ctx: config.context_window,
        },
    }
}

fn content_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pull the assistant text out of an Ollama chat response.
///
/// Reads `message.content` when present, otherwise the `content` of the
/// first object-valued field. Anything else becomes a JSON error object
/// carrying the raw response, which the extractor will then reject.
pub fn chat_content(data: &JsonValue) -> String {
    let Some(object) = data.as_object() else {
        return json!({"error": "Unexpected Ollama response", "raw": data}).to_string();
    };

    if let Some(message) = object.get("message").and_then(JsonValue::as_object) {
        return message.get("content").map(content_text).unwrap_or_default();
    }

    object
        .values()
        .filter_map(JsonValue::as_object)
        .find_map(|inner| inner.get("content"))
        .map(content_text)
        .unwrap_or_else(|| {
            json!({"error": "Unexpected Ollama response", "raw": data}).to_string()
        })
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = request_body(&messages, config);

        tracing::debug!(url = %self.url, model = %config.model, "posting chat request to Ollama");

        let response = self
            .client
            .post(&self.url)
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: JsonValue = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let model = body["model"]
            .as_str()
            .unwrap_or(&config.model)
            .to_string();

        Ok(CompletionResponse {
            content: chat_content(&body),
            model,
        })
    }

    async fn health_check(&self) -> bool {
        let tags = format!("{}/api/tags", url_origin(&self.url));
        match self
            .client
            .get(&tags)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url = %tags, "Ollama health check failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Factory for Ollama backends.
///
/// ## Configuration Format
/// ```json
/// {
///   "url": "http://localhost:11434/api/chat"
/// }
/// ```
pub struct OllamaProviderFactory;

impl ProviderFactory for OllamaProviderFactory {
    fn provider_type(&self) -> &'static str {
        "ollama"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(OllamaProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if let Some(url) = config["url"].as_str() {
            validate_http_url(url, "url")?;
        }
        Ok(())
    }
}
