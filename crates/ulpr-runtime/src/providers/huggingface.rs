//! Hugging Face backend.
//!
//! Serves a locally hosted Hugging Face model through a
//! text-generation-inference compatible `/generate` endpoint. The model sees
//! a plain chat template and the assistant slice of the output is returned.
//!
//! ## Security
//!
//! An optional bearer token is read from config or `HF_TOKEN` and held in an
//! [`ApiCredential`].

use super::{
    factory::ProviderFactory, secrets::ApiCredential, url_origin, validate_http_url, ChatMessage,
    CompletionConfig, CompletionResponse, LlmProvider, ProviderError, DEFAULT_HF_MODEL,
    DEFAULT_HF_URL,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding an optional Hugging Face token.
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";

const ASSISTANT_MARKER: &str = "<|assistant|>";

/// Text-generation-inference backend.
pub struct HuggingFaceProvider {
    url: String,
    credential: Option<ApiCredential>,
    client: reqwest::Client,
}

impl std::fmt::Debug for HuggingFaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceProvider")
            .field("url", &self.url)
            .field("credential", &self.credential)
            .finish()
    }
}

impl HuggingFaceProvider {
    /// Create a backend for the given generate endpoint, without a token.
    pub fn new(url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            credential: None,
            client,
        })
    }

    /// Create from JSON configuration with `HF_TOKEN` fallback for the token.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        let mut provider = Self::new(config["url"].as_str().unwrap_or(DEFAULT_HF_URL))?;
        provider.credential = ApiCredential::optional_from_config_or_env(
            config,
            "api_key",
            HF_TOKEN_ENV,
            "Hugging Face token",
        );
        Ok(provider)
    }

    /// Attach a bearer token.
    pub fn with_credential(mut self, credential: ApiCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// The generate endpoint this backend posts to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Render messages with the `<|role|>` chat template, ending on an open
/// assistant turn.
pub fn chat_template(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        prompt.push_str(&format!("<|{}|>\n{}\n", message.role, message.content));
    }
    prompt.push_str(ASSISTANT_MARKER);
    prompt
}

/// The text after the last assistant marker, trimmed.
pub fn assistant_slice(text: &str) -> &str {
    text.rsplit(ASSISTANT_MARKER).next().unwrap_or(text).trim()
}

/// Read `generated_text` from either the single-object or the list form
/// of a generate response.
fn generated_text(body: &JsonValue) -> Option<&str> {
    match body {
        JsonValue::Array(items) => items.first()?.get("generated_text")?.as_str(),
        other => other.get("generated_text")?.as_str(),
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    inputs: String,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    do_sample: bool,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

fn request_body(messages: &[ChatMessage], config: &CompletionConfig) -> GenerateRequest {
    GenerateRequest {
        inputs: chat_template(messages),
        parameters: GenerateParameters {
            max_new_tokens: config.max_tokens,
            do_sample: true,
            temperature: config.temperature,
            top_p: config.top_p,
        },
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = request_body(&messages, config);

        tracing::debug!(url = %self.url, model = %config.model, "posting generate request");
        if config.model != DEFAULT_HF_MODEL {
            tracing::warn!(
                model = %config.model,
                "the generation server serves a fixed model; the model name is only recorded"
            );
        }

        let mut builder = self
            .client
            .post(&self.url)
            .timeout(config.timeout)
            .json(&request);
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(credential.expose());
        }

        let response = builder.send().await.map_err(|e| {
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

        let text = generated_text(&body).ok_or_else(|| {
            ProviderError::ParseError(format!("no generated_text in response: {}", body))
        })?;

        Ok(CompletionResponse {
            content: assistant_slice(text).to_string(),
            model: config.model.clone(),
        })
    }

    async fn health_check(&self) -> bool {
        let health = format!("{}/health", url_origin(&self.url));
        match self
            .client
            .get(&health)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url = %health, "generation server health check failed");
                false
            }
        }
    }

    fn name(&self) -> &str {
        "hf"
    }
}

/// Factory for Hugging Face backends.
///
/// ## Configuration Format
/// ```json
/// {
///   "url": "http://localhost:8080/generate",
///   "api_key": "hf_..."
/// }
/// ```
pub struct HuggingFaceProviderFactory;

impl ProviderFactory for HuggingFaceProviderFactory {
    fn provider_type(&self) -> &'static str {
        "hf"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(HuggingFaceProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if let Some(url) = config["url"].as_str() {
            validate_http_url(url, "url")?;
        }
        Ok(())
    }
}
