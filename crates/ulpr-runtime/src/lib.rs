//! # ulpr-runtime
//!
//! Model-backed evaluation for the Unified Lesson Plan Rubric.
//!
//! `ulpr-core` does the deterministic scoring. This crate supplies the
//! part that needs a model: the backends (a local Ollama server or a
//! Hugging Face model behind a generation server), YAML configuration, and
//! the [`Evaluator`] that glues prompt, backend and scoring together.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ulpr_runtime::{build_evaluator, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_file("ulpr.yaml")?;
//! let evaluator = build_evaluator(&config)?;
//! let evaluation = evaluator.evaluate(&lesson_text).await?;
//! println!("ULPR Total: {}", evaluation.scorecard.totals.total);
//! ```

pub mod config;
pub mod evaluator;
pub mod providers;

pub use config::{BackendKind, ConfigError, RuntimeConfig};
pub use evaluator::{read_lesson_text, Evaluation, Evaluator};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry,
};

use thiserror::Error;
use ulpr_core::ExtractError;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Model backend failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Model output was not valid JSON: {source}")]
    UnparsableOutput {
        raw: String,
        #[source]
        source: ExtractError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Build an evaluator for the backend the configuration selects.
pub fn build_evaluator(config: &RuntimeConfig) -> Result<Evaluator, RuntimeError> {
    let registry = ProviderRegistry::with_defaults();
    let provider = registry.create(config.backend.as_str(), &config.provider_config())?;
    let completion = config.completion_config()?;

    tracing::debug!(
        backend = %config.backend,
        model = %completion.model,
        timeout = ?completion.timeout,
        "built evaluator"
    );

    Ok(Evaluator::new(provider, completion))
}
