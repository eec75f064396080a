//! JSON Schema for the rater's response.
//!
//! The schema is embedded at compile time. The same text is shown to the
//! model in the prompt and used here to check what comes back.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded response schema (loaded at compile time).
pub const RESPONSE_SCHEMA_JSON: &str = include_str!("../../../schema/model_response.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(RESPONSE_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::LoadError(e.clone())),
    }
}

/// Check a response against the schema.
///
/// Returns every violation as `"<message> at <path>"`. An empty list means
/// the response conforms.
pub fn response_violations(response: &serde_json::Value) -> Result<Vec<String>, SchemaError> {
    let validator = get_validator()?;

    Ok(validator
        .iter_errors(response)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conforming_response() {
        let value = serde_json::json!({
            "criteria": {
                "A1": {"band": 3, "evidence": "Outcomes are listed.", "notes": ""}
            },
            "global_notes": "Solid plan."
        });
        assert!(response_violations(&value).unwrap().is_empty());
    }

    #[test]
    fn test_missing_criteria_is_reported() {
        let value = serde_json::json!({"global_notes": "nothing else"});
        let violations = response_violations(&value).unwrap();
        assert!(!violations.is_empty());
    }

    #[test]
    fn test_out_of_range_band_is_reported() {
        let value = serde_json::json!({
            "criteria": {"B2": {"band": 7, "evidence": ""}}
        });
        let violations = response_violations(&value).unwrap();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("/criteria/B2/band"));
    }
}
