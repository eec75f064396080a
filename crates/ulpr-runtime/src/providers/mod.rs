//! Model backends for ulpr-runtime.
//!
//! A backend turns a system prompt and a user prompt into text. Two
//! implementations exist: a local Ollama server and a locally hosted
//! Hugging Face model behind a text-generation-inference endpoint.
//!
//! ## Security
//!
//! Backends that take a token use the [`secrets`] module so the value never
//! reaches logs or Debug output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "huggingface")]
mod huggingface;
#[cfg(feature = "ollama")]
mod ollama;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "huggingface")]
pub use huggingface::{HuggingFaceProvider, HuggingFaceProviderFactory, HF_TOKEN_ENV};
#[cfg(feature = "ollama")]
pub use ollama::{OllamaProvider, OllamaProviderFactory};

/// Default Ollama chat endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/chat";

/// Default local text-generation-inference endpoint.
pub const DEFAULT_HF_URL: &str = "http://localhost:8080/generate";

/// Default model for the Ollama backend.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Default model for the Hugging Face backend.
pub const DEFAULT_HF_MODEL: &str = "Qwen/Qwen2.5-7B-Instruct";

/// Errors from model backends.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Configuration for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model to use
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling cutoff, when the backend supports it
    pub top_p: Option<f32>,

    /// Context window requested from the backend
    pub context_window: Option<u32>,

    /// Request timeout
    pub timeout: Duration,
}

impl CompletionConfig {
    /// Defaults used with an Ollama server.
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 2048,
            temperature: 0.1,
            top_p: None,
            context_window: Some(8192),
            timeout: Duration::from_secs(120),
        }
    }

    /// Defaults used with a Hugging Face generation server.
    pub fn huggingface(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 2048,
            temperature: 0.2,
            top_p: Some(0.9),
            context_window: None,
            timeout: Duration::from_secs(120),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self::ollama(DEFAULT_OLLAMA_MODEL)
    }
}

/// A chat message for model completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role: "system" or "user"
    pub role: String,

    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content
    pub content: String,

    /// Model that produced the content
    pub model: String,
}

/// Backend abstraction allows swapping model servers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Execute a chat completion.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Get provider name for logs.
    fn name(&self) -> &str;

    /// Generate text from a system prompt and a user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        config: &CompletionConfig,
    ) -> Result<String, ProviderError> {
        let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)];
        Ok(self.complete(messages, config).await?.content)
    }
}

/// The scheme and authority of a URL, without path.
///
/// `http://localhost:11434/api/chat` becomes `http://localhost:11434`.
#[cfg_attr(not(any(feature = "ollama", feature = "huggingface")), allow(dead_code))]
pub(crate) fn url_origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(slash) => &url[..after_scheme + slash],
        None => url,
    }
}

/// Check that a configured URL is an HTTP(S) URL.
#[cfg_attr(not(any(feature = "ollama", feature = "huggingface")), allow(dead_code))]
pub(crate) fn validate_http_url(url: &str, field: &str) -> Result<(), ProviderError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ProviderError::NotConfigured(format!(
            "{} must start with http:// or https://",
            field
        )))
    }
}
