//! Best-effort extraction of a JSON object from model output.
//!
//! Models wrap their answer in prose, code fences or slightly broken
//! escapes. Extraction tries, in order:
//! 1. The whole text as a JSON object
//! 2. The span from the first `{` to the last `}`
//! 3. That span after textual repairs

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

lazy_static! {
    /// A literal backslash-n sequence left in place of a newline.
    static ref ESCAPED_NEWLINE: Regex = Regex::new(r"\\n").unwrap();

    /// A backslash-escaped single quote used as a string delimiter.
    static ref ESCAPED_SINGLE_QUOTE: Regex = Regex::new(r"\\'").unwrap();
}

/// Errors from JSON extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Could not parse JSON from model output: no object found")]
    NoObject,

    #[error("Could not parse JSON from model output: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Could not parse JSON from model output: top-level value is not an object")]
    NotAnObject,
}

/// Extract the outermost JSON object from arbitrary text.
pub fn extract_json(text: &str) -> Result<Map<String, Value>, ExtractError> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Ok(map);
    }

    let snippet = outermost_braces(text).ok_or(ExtractError::NoObject)?;

    match serde_json::from_str::<Value>(snippet) {
        Ok(value) => into_object(value),
        Err(first) => {
            tracing::debug!(error = %first, "direct parse of braced span failed, attempting repairs");
            let repaired = repair(snippet);
            let value = serde_json::from_str::<Value>(&repaired)?;
            into_object(value)
        }
    }
}

/// The span from the first `{` to the last `}`, inclusive.
fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Apply the common textual repairs.
fn repair(snippet: &str) -> String {
    let step = ESCAPED_NEWLINE.replace_all(snippet, "\n");
    ESCAPED_SINGLE_QUOTE.replace_all(&step, "\"").into_owned()
}

fn into_object(value: Value) -> Result<Map<String, Value>, ExtractError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractError::NotAnObject),
    }
}
