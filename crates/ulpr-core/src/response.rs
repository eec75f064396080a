//! Validated view of the rater's JSON response.
//!
//! The model output is untyped. This module turns it into one entry per
//! rubric code, filling defaults for anything missing or malformed:
//! - absent or non-object entries rate band 0 with empty text
//! - bands are clamped to 0-4
//! - evidence and notes are truncated

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::rubric;
use crate::types::{Rating, RatingSet, MAX_BAND};

/// Maximum characters kept from evidence and notes.
pub const MAX_TEXT_CHARS: usize = 1200;

/// One criterion as reported by the rater, after normalisation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriterionEntry {
    pub band: u8,
    pub evidence: String,
    pub notes: String,
}

/// The rater's response with every rubric code present.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    /// One entry per rubric code
    pub entries: BTreeMap<String, CriterionEntry>,

    /// Codes absent from the response's `criteria` object
    pub missing_codes: Vec<String>,

    /// Free-text notes covering the whole plan
    pub global_notes: Option<String>,
}

impl ModelResponse {
    /// Normalise a raw response object.
    pub fn from_object(raw: &Map<String, Value>) -> Self {
        let reported = raw.get("criteria").and_then(Value::as_object);

        let mut entries = BTreeMap::new();
        let mut missing_codes = Vec::new();

        for criterion in rubric::criteria() {
            let entry = reported.and_then(|map| map.get(criterion.code));
            if entry.is_none() {
                missing_codes.push(criterion.code.to_string());
            }
            entries.insert(criterion.code.to_string(), normalise_entry(entry));
        }

        let global_notes = raw.get("global_notes").and_then(text_value).filter(|s| !s.is_empty());

        Self {
            entries,
            missing_codes,
            global_notes,
        }
    }

    /// Build ratings for every rubric criterion.
    pub fn ratings(&self) -> RatingSet {
        rubric::criteria()
            .iter()
            .map(|criterion| {
                let entry = self.entries.get(criterion.code).cloned().unwrap_or_default();
                (
                    criterion.code.to_string(),
                    Rating::new(criterion, entry.band, entry.evidence, entry.notes),
                )
            })
            .collect()
    }
}

fn normalise_entry(entry: Option<&Value>) -> CriterionEntry {
    let Some(fields) = entry.and_then(Value::as_object) else {
        return CriterionEntry::default();
    };

    CriterionEntry {
        band: fields.get("band").map(clamp_band).unwrap_or(0),
        evidence: fields
            .get("evidence")
            .and_then(text_value)
            .map(|s| truncate_chars(&s, MAX_TEXT_CHARS))
            .unwrap_or_default(),
        notes: fields
            .get("notes")
            .and_then(text_value)
            .map(|s| truncate_chars(&s, MAX_TEXT_CHARS))
            .unwrap_or_default(),
    }
}

/// Convert a reported band to 0-4.
///
/// Integers clamp, floats truncate toward zero first, numeric strings are
/// parsed, booleans count as 0/1. Anything else is band 0.
pub fn clamp_band(value: &Value) -> u8 {
    let parsed: Option<i64> = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };

    match parsed {
        Some(n) => n.clamp(0, i64::from(MAX_BAND)) as u8,
        None => 0,
    }
}

/// Text for a free-text field: strings as-is, null as nothing, anything
/// else as its JSON rendering.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Keep at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
