//! # ulpr-core
//!
//! Deterministic scoring for the Unified Lesson Plan Rubric (ULPR).
//!
//! This crate turns a rater's JSON response into a weighted 0-100
//! scorecard:
//! - Extract the JSON object from free-form model output
//! - Normalise it against the 17-criterion rubric (missing codes rate 0)
//! - Apply the cross-criterion guardrails
//! - Compute totals and render a Markdown report
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same response always produces the same scorecard
//! 2. **No LLM calls**: Model access lives in `ulpr-runtime`
//! 3. **Bounded**: Every band is 0-4 and the total is within 0-100
//!
//! ## Example
//!
//! ```rust,ignore
//! use ulpr_core::{score_text, format_markdown_report, MarkdownOptions};
//!
//! let (_raw, scorecard) = score_text(&model_output)?;
//! println!("{}", format_markdown_report(&scorecard, lesson, &MarkdownOptions::default()));
//! ```

pub mod extract;
pub mod guardrails;
pub mod prompt;
pub mod report;
pub mod response;
pub mod rubric;
pub mod schema;
pub mod types;

pub use extract::{extract_json, ExtractError};
pub use guardrails::{apply_caps, Guardrail, GuardrailEngine};
pub use prompt::{build_user_prompt, SYSTEM_PROMPT};
pub use report::{format_markdown_report, totals, MarkdownOptions};
pub use response::{clamp_band, ModelResponse};
pub use rubric::{criteria, criterion, Criterion};
pub use types::{GuardrailNote, Rating, RatingSet, Scorecard, Section, Totals};

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while scoring model output.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Score a raw response object with the standard guardrails.
pub fn score_response(raw: &Map<String, Value>) -> Scorecard {
    score_response_with(raw, &GuardrailEngine::new())
}

/// Score a raw response object with a specific guardrail engine.
pub fn score_response_with(raw: &Map<String, Value>, engine: &GuardrailEngine) -> Scorecard {
    report_schema_violations(raw);

    let response = ModelResponse::from_object(raw);
    if !response.missing_codes.is_empty() {
        tracing::warn!(
            missing = ?response.missing_codes,
            "model omitted rubric codes, defaulting them to band 0"
        );
    }

    let mut ratings = response.ratings();
    let guardrail_notes = engine.apply(&mut ratings);
    let totals = totals(&ratings);

    tracing::debug!(
        total = totals.total,
        guardrails = guardrail_notes.len(),
        "scored response"
    );

    Scorecard {
        ratings,
        guardrail_notes,
        totals,
        missing_codes: response.missing_codes,
        global_notes: response.global_notes,
        evaluated_at: Utc::now(),
    }
}

/// Extract the JSON object from model output and score it.
///
/// Returns the raw object alongside the scorecard so callers can persist
/// exactly what the model said.
pub fn score_text(text: &str) -> Result<(Map<String, Value>, Scorecard), ScoringError> {
    let raw = extract_json(text)?;
    let scorecard = score_response(&raw);
    Ok((raw, scorecard))
}

fn report_schema_violations(raw: &Map<String, Value>) {
    match schema::response_violations(&Value::Object(raw.clone())) {
        Ok(violations) => {
            for violation in violations {
                tracing::warn!(%violation, "model response does not match schema");
            }
        }
        Err(e) => tracing::warn!(error = %e, "response schema unavailable"),
    }
}
