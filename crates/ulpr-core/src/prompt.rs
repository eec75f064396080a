//! Prompt construction for the rater model.
//!
//! The prompt is deterministic for a given lesson: fixed instructions, a
//! skeleton response with every code, the response schema and the
//! condensed rubric, followed by the lesson plan itself.

use serde_json::{json, Map, Value};

use crate::rubric::{self, Criterion};
use crate::schema::RESPONSE_SCHEMA_JSON;

/// System prompt establishing the rater role and output contract.
pub const SYSTEM_PROMPT: &str = "You are an expert rater of lesson plans. Score using the Unified Lesson Plan Rubric (ULPR) with bands 0–4. \
Use only evidence visible in the plan. If evidence is missing or vague, choose the lower band. \
Return ONLY a single valid JSON object (no prose, no markdown). \
You MUST include ALL criterion codes exactly once: A1, A2, A3, B1, B2, B3, C1, C2, C3, D1, D2, D3, E1, E2, E3, F1, F2.";

const INSTRUCTIONS: &str = "Score the following lesson plan using the Unified Lesson Plan Rubric (ULPR) with bands 0–4.
For each criterion code (A1..F2), choose ONE band (0–4) and provide 1–3 sentences of evidence quoted or paraphrased from the plan.
If a claim (e.g., 'interactive' or 'alignment') is asserted but not operationalized with routines/tools/timing, score lower.

Ties go LOWER if the plan does not include explicit artifacts (items, prompts, rubrics, timings, roles, etc.).

Return ONLY valid JSON and include ALL codes. Use exactly this object structure (ALL keys must exist):";

/// Render one criterion for the condensed rubric.
fn criterion_block(c: &Criterion) -> String {
    let bands = c
        .band_notes
        .iter()
        .enumerate()
        .map(|(i, note)| format!("  {}: {}", i, note))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{} — {} (weight {})\nWhat to look for: {}\nBands:\n{}\n",
        c.code, c.name, c.weight, c.description, bands
    )
}

/// The condensed rubric text shown to the model.
pub fn rubric_text() -> String {
    rubric::criteria()
        .iter()
        .map(criterion_block)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A response with every code present and default values.
pub fn response_skeleton() -> Value {
    let criteria: Map<String, Value> = rubric::codes()
        .map(|code| {
            (
                code.to_string(),
                json!({"band": 0, "evidence": "", "notes": ""}),
            )
        })
        .collect();

    json!({
        "criteria": criteria,
        "global_notes": "",
    })
}

/// Build the user prompt for a lesson plan.
pub fn build_user_prompt(lesson_text: &str) -> String {
    // Pretty printing a Value cannot fail.
    let skeleton = serde_json::to_string_pretty(&response_skeleton()).unwrap_or_default();

    let prompt = format!(
        "{}\n{}\n\nAlso adhere to this JSON schema:\n{}\n\nRubric (condensed):\n{}\n\nLesson Plan:",
        INSTRUCTIONS,
        skeleton,
        RESPONSE_SCHEMA_JSON.trim_end(),
        rubric_text()
    );

    format!("{}\n\n{}", prompt.trim(), lesson_text.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_lists_every_code() {
        for code in rubric::codes() {
            assert!(SYSTEM_PROMPT.contains(code), "missing {}", code);
        }
    }

    #[test]
    fn test_skeleton_has_every_code() {
        let skeleton = response_skeleton();
        let criteria = skeleton["criteria"].as_object().unwrap();
        assert_eq!(criteria.len(), 17);
        assert_eq!(criteria["D2"]["band"], 0);
        assert_eq!(skeleton["global_notes"], "");
    }

    #[test]
    fn test_criterion_block_layout() {
        let block = criterion_block(rubric::criterion("E1").unwrap());
        assert!(block.starts_with("E1 — Intrinsic Load Sequencing (weight 3)\nWhat to look for: "));
        assert!(block.contains("Bands:\n  0: Jumps into complexity; no scaffolding.\n  1: "));
        assert!(block.ends_with("staged complexity.\n"));
    }

    #[test]
    fn test_user_prompt_structure() {
        let prompt = build_user_prompt("\n  Lesson: Photosynthesis, 50 minutes.\n");

        assert!(prompt.starts_with("Score the following lesson plan"));
        assert!(prompt.contains("\"A1\": {\n      \"band\": 0,"));
        assert!(prompt.contains("Also adhere to this JSON schema:\n{\n  \"type\": \"object\""));
        assert!(prompt.contains("Rubric (condensed):\nA1 — SMARTIE Outcomes"));
        assert!(prompt.ends_with("Lesson Plan:\n\nLesson: Photosynthesis, 50 minutes."));
    }

    #[test]
    fn test_user_prompt_is_deterministic() {
        assert_eq!(build_user_prompt("same"), build_user_prompt("same"));
    }
}
