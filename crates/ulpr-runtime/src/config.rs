//! Evaluator configuration from YAML.
//!
//! ```yaml
//! backend: ollama
//! model: llama3.1
//! timeout: 120s
//! ollama:
//!   url: http://localhost:11434/api/chat
//!   temperature: 0.1
//!   num_ctx: 8192
//! hf:
//!   url: http://localhost:8080/generate
//!   temperature: 0.2
//!   top_p: 0.9
//!   max_new_tokens: 2048
//! ```
//!
//! Every field is optional. Command-line flags override whatever the file
//! sets.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::providers::{
    CompletionConfig, DEFAULT_HF_MODEL, DEFAULT_HF_URL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL,
};

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid timeout '{value}': {reason}")]
    InvalidTimeout { value: String, reason: String },

    #[error("Unknown backend '{0}', expected 'ollama' or 'hf'")]
    UnknownBackend(String),
}

/// Which model server to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    Hf,
}

impl BackendKind {
    /// Registry name of this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Hf => "hf",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            BackendKind::Ollama => DEFAULT_OLLAMA_MODEL,
            BackendKind::Hf => DEFAULT_HF_MODEL,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ollama" => Ok(BackendKind::Ollama),
            "hf" => Ok(BackendKind::Hf),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Ollama server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub url: String,
    pub temperature: f32,
    pub num_ctx: u32,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            temperature: 0.1,
            num_ctx: 8192,
        }
    }
}

/// Generation server settings for the Hugging Face backend.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HfSettings {
    pub url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_new_tokens: u32,
    /// Falls back to `HF_TOKEN` when unset.
    pub api_key: Option<String>,
}

impl Default for HfSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_HF_URL.to_string(),
            temperature: 0.2,
            top_p: 0.9,
            max_new_tokens: 2048,
            api_key: None,
        }
    }
}

impl fmt::Debug for HfSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HfSettings")
            .field("url", &self.url)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Full evaluator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub backend: BackendKind,

    /// Model name; the backend's default when unset.
    pub model: Option<String>,

    /// Request timeout in humantime form, e.g. `120s` or `2m`.
    pub timeout: String,

    pub ollama: OllamaSettings,

    pub hf: HfSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            model: None,
            timeout: "120s".to_string(),
            ollama: OllamaSettings::default(),
            hf: HfSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.timeout()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parsed request timeout.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.timeout).map_err(|e| ConfigError::InvalidTimeout {
            value: self.timeout.clone(),
            reason: e.to_string(),
        })
    }

    /// Model name in effect for the selected backend.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Completion settings for the selected backend.
    pub fn completion_config(&self) -> Result<CompletionConfig, ConfigError> {
        let timeout = self.timeout()?;
        let config = match self.backend {
            BackendKind::Ollama => CompletionConfig {
                temperature: self.ollama.temperature,
                context_window: Some(self.ollama.num_ctx),
                timeout,
                ..CompletionConfig::ollama(self.model_name())
            },
            BackendKind::Hf => CompletionConfig {
                temperature: self.hf.temperature,
                top_p: Some(self.hf.top_p),
                max_tokens: self.hf.max_new_tokens,
                timeout,
                ..CompletionConfig::huggingface(self.model_name())
            },
        };
        Ok(config)
    }

    /// JSON handed to the backend factory.
    pub fn provider_config(&self) -> JsonValue {
        match self.backend {
            BackendKind::Ollama => json!({ "url": self.ollama.url }),
            BackendKind::Hf => {
                let mut config = json!({ "url": self.hf.url });
                if let Some(key) = &self.hf.api_key {
                    config["api_key"] = json!(key);
                }
                config
            }
        }
    }
}
