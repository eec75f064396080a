//! Markdown rendering of a scorecard.

use crate::response::truncate_chars;
use crate::types::{Scorecard, Section};

use super::round_points;

/// Characters of the lesson plan reproduced at the end of the report.
pub const EXCERPT_CHARS: usize = 1200;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Maximum lesson-plan characters in the excerpt section
    pub excerpt_chars: usize,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            excerpt_chars: EXCERPT_CHARS,
        }
    }
}

/// Render the full Markdown report.
///
/// Sections appear in rubric order, followed by guardrail notes, the
/// rater's global notes and a short excerpt of the lesson plan. Empty
/// trailing blocks are omitted.
pub fn format_markdown_report(
    scorecard: &Scorecard,
    lesson_excerpt: &str,
    options: &MarkdownOptions,
) -> String {
    let totals = &scorecard.totals;
    let mut blocks: Vec<String> = Vec::new();

    blocks.push(format!(
        "# Unified Lesson Plan Report (ULPR)\n\nTotal: **{} / 100**\n\n",
        round_points(totals.total)
    ));

    for section in Section::ALL {
        blocks.push(format!(
            "## {}. {} — {} pts\n",
            section,
            section.title(),
            round_points(totals.section(section))
        ));

        for rating in scorecard
            .ratings
            .values()
            .filter(|r| r.section() == Some(section))
        {
            let mut entry = format!(
                "**{} {}** — band {} → {:.1}/{}\n\n*Evidence:* {}\n\n",
                rating.code, rating.name, rating.band, rating.points, rating.weight, rating.evidence
            );
            if !rating.notes.is_empty() {
                entry.push_str(&format!("*Notes:* {}\n\n", rating.notes));
            }
            blocks.push(entry);
        }
    }

    if !scorecard.guardrail_notes.is_empty() {
        blocks.push("---\n\n### Caps & Guardrails Applied\n".to_string());
        for note in &scorecard.guardrail_notes {
            blocks.push(format!("- {}", note));
        }
        blocks.push("\n".to_string());
    }

    if let Some(global) = scorecard.global_notes.as_deref().filter(|g| !g.is_empty()) {
        blocks.push(format!("---\n\n### Rater Global Notes\n{}\n", global));
    }

    let excerpt = lesson_excerpt.trim();
    if !excerpt.is_empty() {
        let mut short = truncate_chars(excerpt, options.excerpt_chars);
        if excerpt.chars().count() > options.excerpt_chars {
            short.push('…');
        }
        blocks.push(format!("---\n\n### Lesson Plan (excerpt)\n\n{}\n", short));
    }

    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::totals;
    use crate::rubric;
    use crate::types::{GuardrailNote, Rating, RatingSet};
    use chrono::Utc;

    fn scorecard(band: u8) -> Scorecard {
        let ratings: RatingSet = rubric::criteria()
            .iter()
            .map(|c| {
                (
                    c.code.to_string(),
                    Rating::new(c, band, format!("evidence for {}", c.code), ""),
                )
            })
            .collect();
        let totals = totals(&ratings);
        Scorecard {
            ratings,
            guardrail_notes: vec![],
            totals,
            missing_codes: vec![],
            global_notes: None,
            evaluated_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_and_sections() {
        let md = format_markdown_report(&scorecard(2), "", &MarkdownOptions::default());

        assert!(md.starts_with("# Unified Lesson Plan Report (ULPR)\n\nTotal: **50 / 100**\n\n"));
        assert!(md.contains("## A. Outcomes & Alignment — 12 pts\n"));
        assert!(md.contains("## F. Inclusivity, Culture & Reflection — 4 pts\n"));
        assert!(md.contains(
            "**A1 SMARTIE Outcomes & Success Criteria** — band 2 → 4.0/8\n\n*Evidence:* evidence for A1\n\n"
        ));
        assert!(!md.contains("*Notes:*"));
        assert!(!md.contains("Caps & Guardrails"));
        assert!(!md.contains("Lesson Plan (excerpt)"));
    }

    #[test]
    fn test_section_order() {
        let md = format_markdown_report(&scorecard(1), "", &MarkdownOptions::default());
        let a = md.find("## A.").unwrap();
        let c = md.find("## C.").unwrap();
        let f = md.find("## F.").unwrap();
        assert!(a < c && c < f);
        assert!(md.find("**C1").unwrap() < md.find("**C3").unwrap());
    }

    #[test]
    fn test_notes_guardrails_and_global_notes() {
        let mut card = scorecard(3);
        card.ratings.get_mut("B3").unwrap().notes = "Roles are explicit.".to_string();
        card.guardrail_notes.push(GuardrailNote {
            rule_id: "retrieval-maturity".to_string(),
            code: "C2".to_string(),
            from_band: 4,
            to_band: 3,
            message: "Retrieval maturity guardrail: C2 4→3 because spacing/delays/cumulative (C3) are weak."
                .to_string(),
        });
        card.global_notes = Some("Strong overall.".to_string());

        let md = format_markdown_report(&card, "", &MarkdownOptions::default());
        assert!(md.contains("*Notes:* Roles are explicit.\n\n"));
        assert!(md.contains(
            "---\n\n### Caps & Guardrails Applied\n\n- Retrieval maturity guardrail: C2 4→3"
        ));
        assert!(md.contains("---\n\n### Rater Global Notes\nStrong overall.\n"));
    }

    #[test]
    fn test_excerpt_truncation() {
        let lesson = "y".repeat(EXCERPT_CHARS + 10);
        let md = format_markdown_report(&scorecard(0), &lesson, &MarkdownOptions::default());
        let expected = format!("### Lesson Plan (excerpt)\n\n{}…\n", "y".repeat(EXCERPT_CHARS));
        assert!(md.ends_with(&expected));
    }

    #[test]
    fn test_short_excerpt_is_kept_whole() {
        let md = format_markdown_report(&scorecard(0), "  Fractions, year 5.  ", &MarkdownOptions::default());
        assert!(md.ends_with("### Lesson Plan (excerpt)\n\nFractions, year 5.\n"));
    }
}
