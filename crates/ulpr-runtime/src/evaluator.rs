//! The evaluation pipeline: prompt, query, extract, score.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};
use ulpr_core::{
    build_user_prompt, extract_json, score_response_with, GuardrailEngine, Scorecard,
    SYSTEM_PROMPT,
};

use crate::providers::{CompletionConfig, LlmProvider};
use crate::RuntimeError;

/// Result of evaluating one lesson plan.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Text exactly as the backend returned it.
    pub raw_text: String,

    /// The JSON object extracted from `raw_text`.
    pub model_json: Map<String, Value>,

    pub scorecard: Scorecard,
}

/// Runs lesson plans through a backend and scores the result.
pub struct Evaluator {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
    engine: GuardrailEngine,
}

impl Evaluator {
    /// Create an evaluator with the standard guardrails.
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
            engine: GuardrailEngine::new(),
        }
    }

    /// Replace the guardrail engine.
    pub fn with_engine(mut self, engine: GuardrailEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &str {
        self.provider.name()
    }

    /// Check whether the backend answers.
    pub async fn backend_reachable(&self) -> bool {
        self.provider.health_check().await
    }

    /// Evaluate one lesson plan.
    ///
    /// Output that contains no JSON object is logged in full and returned
    /// inside [`RuntimeError::UnparsableOutput`].
    pub async fn evaluate(&self, lesson_text: &str) -> Result<Evaluation, RuntimeError> {
        let user_prompt = build_user_prompt(lesson_text);

        tracing::info!(
            backend = self.provider.name(),
            model = %self.completion.model,
            "querying model"
        );

        let raw_text = self
            .provider
            .generate(SYSTEM_PROMPT, &user_prompt, &self.completion)
            .await?;

        let model_json = match extract_json(&raw_text) {
            Ok(object) => object,
            Err(source) => {
                tracing::error!(raw = %raw_text, "model output was not valid JSON");
                return Err(RuntimeError::UnparsableOutput {
                    raw: raw_text,
                    source,
                });
            }
        };

        let scorecard = score_response_with(&model_json, &self.engine);

        Ok(Evaluation {
            raw_text,
            model_json,
            scorecard,
        })
    }
}

/// Read a lesson plan: an existing file's contents, otherwise the argument
/// itself as raw text.
pub fn read_lesson_text(arg: &str) -> io::Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        fs::read_to_string(path)
    } else {
        Ok(arg.to_string())
    }
}
