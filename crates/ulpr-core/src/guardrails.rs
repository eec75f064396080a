//! Cross-criterion guardrails.
//!
//! A guardrail caps or demotes one criterion's band based on another
//! criterion's band. The engine runs its rules in a fixed order and each
//! rule reads the current, possibly already adjusted, ratings:
//! 1. Weak alignment (A2 ≤ 1) caps B2 and C2 at 2
//! 2. Unmeasurable outcomes (A1 ≤ 1) cap A2 at 2
//! 3. Missing load monitoring (E3 < 2) demotes E1/E2 from 4 to 3
//! 4. Weak spacing (C3 ≤ 1) demotes C2 from 4 to 3
//!
//! Codes missing from the rating set are skipped. Every rule only lowers
//! bands, so a second pass over the same ratings changes nothing.

use crate::types::{GuardrailNote, RatingSet};

/// A deterministic cross-criterion adjustment.
pub trait Guardrail: Send + Sync {
    /// Stable identifier used in notes and logs.
    fn id(&self) -> &'static str;

    /// Adjust ratings in place and describe every change made.
    fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote>;
}

fn band(ratings: &RatingSet, code: &str) -> Option<u8> {
    ratings.get(code).map(|r| r.band)
}

/// Set `code` to `to` and return the previous band if it differs.
fn adjust(ratings: &mut RatingSet, code: &str, to: u8) -> Option<u8> {
    let rating = ratings.get_mut(code)?;
    let from = rating.band;
    if from == to {
        return None;
    }
    rating.set_band(to);
    Some(from)
}

fn note(rule_id: &str, code: &str, from_band: u8, to_band: u8, message: String) -> GuardrailNote {
    GuardrailNote {
        rule_id: rule_id.to_string(),
        code: code.to_string(),
        from_band,
        to_band,
        message,
    }
}

/// A2 ≤ 1 caps the generative-task and formative-check criteria at 2.
pub struct AlignmentCap;

impl Guardrail for AlignmentCap {
    fn id(&self) -> &'static str {
        "alignment-cap"
    }

    fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote> {
        let Some(a2) = band(ratings, "A2").filter(|b| *b <= 1) else {
            return vec![];
        };

        let mut notes = Vec::new();
        for code in ["B2", "C2"] {
            if band(ratings, code).is_some_and(|b| b > 2) {
                if let Some(old) = adjust(ratings, code, 2) {
                    notes.push(note(
                        self.id(),
                        code,
                        old,
                        2,
                        format!(
                            "Cap applied: {} reduced from {} to 2 due to weak alignment (A2={}).",
                            code, old, a2
                        ),
                    ));
                }
            }
        }
        notes
    }
}

/// A1 ≤ 1 caps alignment (A2) at 2.
pub struct OutcomeMeasurabilityCap;

impl Guardrail for OutcomeMeasurabilityCap {
    fn id(&self) -> &'static str {
        "outcome-measurability-cap"
    }

    fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote> {
        if !band(ratings, "A1").is_some_and(|b| b <= 1) {
            return vec![];
        }
        if !band(ratings, "A2").is_some_and(|b| b > 2) {
            return vec![];
        }

        match adjust(ratings, "A2", 2) {
            Some(old) => vec![note(
                self.id(),
                "A2",
                old,
                2,
                format!(
                    "Cap applied: A2 reduced from {} to 2 because outcomes (A1) are not measurable enough.",
                    old
                ),
            )],
            None => vec![],
        }
    }
}

/// E3 < 2 prevents E1 and E2 from reaching band 4.
pub struct LoadMonitoringGuardrail;

impl Guardrail for LoadMonitoringGuardrail {
    fn id(&self) -> &'static str {
        "clt-load-monitoring"
    }

    fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote> {
        if !band(ratings, "E3").is_some_and(|b| b < 2) {
            return vec![];
        }

        let mut notes = Vec::new();
        for code in ["E1", "E2"] {
            if band(ratings, code) == Some(4) && adjust(ratings, code, 3).is_some() {
                notes.push(note(
                    self.id(),
                    code,
                    4,
                    3,
                    format!("CLT guardrail: {} 4→3 since load monitoring (E3) < 2.", code),
                ));
            }
        }
        notes
    }
}

/// C3 ≤ 1 prevents C2 from reaching band 4.
pub struct RetrievalMaturityGuardrail;

impl Guardrail for RetrievalMaturityGuardrail {
    fn id(&self) -> &'static str {
        "retrieval-maturity"
    }

    fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote> {
        let c3_weak = band(ratings, "C3").is_some_and(|b| b <= 1);
        if !c3_weak || band(ratings, "C2") != Some(4) {
            return vec![];
        }

        match adjust(ratings, "C2", 3) {
            Some(_) => vec![note(
                self.id(),
                "C2",
                4,
                3,
                "Retrieval maturity guardrail: C2 4→3 because spacing/delays/cumulative (C3) are weak."
                    .to_string(),
            )],
            None => vec![],
        }
    }
}

/// Runs guardrails in registration order.
pub struct GuardrailEngine {
    rules: Vec<Box<dyn Guardrail>>,
}

impl GuardrailEngine {
    /// The standard ULPR rule set, in evaluation order.
    pub fn new() -> Self {
        Self::empty()
            .with_rule(AlignmentCap)
            .with_rule(OutcomeMeasurabilityCap)
            .with_rule(LoadMonitoringGuardrail)
            .with_rule(RetrievalMaturityGuardrail)
    }

    /// An engine with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule; it runs after every rule already registered.
    pub fn with_rule(mut self, rule: impl Guardrail + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Identifiers of the registered rules in order.
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Apply every rule in order, returning all notes produced.
    pub fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote> {
        let mut notes = Vec::new();
        for rule in &self.rules {
            let fired = rule.apply(ratings);
            for n in &fired {
                tracing::debug!(
                    rule = rule.id(),
                    code = %n.code,
                    from = n.from_band,
                    to = n.to_band,
                    "guardrail applied"
                );
            }
            notes.extend(fired);
        }
        notes
    }
}

impl Default for GuardrailEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the standard guardrails to a rating set.
pub fn apply_caps(ratings: &mut RatingSet) -> Vec<GuardrailNote> {
    GuardrailEngine::new().apply(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::{self, criterion};
    use crate::types::{points_for, Rating};

    fn ratings_with(bands: &[(&str, u8)]) -> RatingSet {
        let mut ratings: RatingSet = rubric::criteria()
            .iter()
            .map(|c| (c.code.to_string(), Rating::new(c, 3, "", "")))
            .collect();
        for (code, b) in bands {
            ratings.get_mut(*code).unwrap().set_band(*b);
        }
        ratings
    }

    #[test]
    fn test_engine_order() {
        assert_eq!(
            GuardrailEngine::new().rule_ids(),
            vec![
                "alignment-cap",
                "outcome-measurability-cap",
                "clt-load-monitoring",
                "retrieval-maturity"
            ]
        );
    }

    #[test]
    fn test_weak_alignment_caps_b2_and_c2() {
        let mut ratings = ratings_with(&[("A2", 1), ("B2", 4), ("C2", 3)]);
        let notes = apply_caps(&mut ratings);

        assert_eq!(ratings["B2"].band, 2);
        assert_eq!(ratings["C2"].band, 2);
        assert_eq!(ratings["C2"].points, points_for(7.0, 2));
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes[0].message,
            "Cap applied: B2 reduced from 4 to 2 due to weak alignment (A2=1)."
        );
    }

    #[test]
    fn test_unmeasurable_outcomes_cap_a2() {
        let mut ratings = ratings_with(&[("A1", 0), ("A2", 4)]);
        let notes = apply_caps(&mut ratings);

        let weight = criterion("A2").unwrap().weight;
        assert_eq!(ratings["A2"].band, 2);
        assert_eq!(ratings["A2"].points, weight * 2.0 / 4.0);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].rule_id, "outcome-measurability-cap");
        assert_eq!(notes[0].from_band, 4);
    }

    #[test]
    fn test_rule_two_does_not_feed_rule_one() {
        // A2 lowered to 2 by rule 2 stays above the rule 1 trigger.
        let mut ratings = ratings_with(&[("A1", 1), ("A2", 4), ("B2", 4)]);
        apply_caps(&mut ratings);
        assert_eq!(ratings["A2"].band, 2);
        assert_eq!(ratings["B2"].band, 4);
    }

    #[test]
    fn test_low_load_monitoring_demotes_e1_e2() {
        let mut ratings = ratings_with(&[("E3", 1), ("E1", 4), ("E2", 4)]);
        let notes = apply_caps(&mut ratings);

        assert_eq!(ratings["E1"].band, 3);
        assert_eq!(ratings["E2"].band, 3);
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes[1].message,
            "CLT guardrail: E2 4→3 since load monitoring (E3) < 2."
        );
    }

    #[test]
    fn test_load_monitoring_only_touches_band_four() {
        let mut ratings = ratings_with(&[("E3", 0), ("E1", 3), ("E2", 2)]);
        assert!(apply_caps(&mut ratings).is_empty());
    }

    #[test]
    fn test_retrieval_maturity_boundary() {
        let mut weak = ratings_with(&[("C3", 1), ("C2", 4)]);
        apply_caps(&mut weak);
        assert_eq!(weak["C2"].band, 3);

        let mut adequate = ratings_with(&[("C3", 2), ("C2", 4)]);
        assert!(apply_caps(&mut adequate).is_empty());
        assert_eq!(adequate["C2"].band, 4);
    }

    #[test]
    fn test_missing_codes_are_skipped() {
        let mut ratings = ratings_with(&[("A2", 0), ("E3", 0)]);
        ratings.remove("B2");
        ratings.remove("C2");
        ratings.remove("E1");
        ratings.remove("E2");

        let notes = apply_caps(&mut ratings);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_empty_rating_set() {
        let mut ratings = RatingSet::new();
        assert!(apply_caps(&mut ratings).is_empty());
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut ratings = ratings_with(&[("A1", 0), ("A2", 1), ("B2", 4), ("C2", 4), ("C3", 0), ("E3", 0), ("E1", 4)]);
        let first = apply_caps(&mut ratings);
        assert!(!first.is_empty());

        let snapshot = ratings.clone();
        let second = apply_caps(&mut ratings);
        assert!(second.is_empty());
        assert_eq!(ratings, snapshot);
    }

    #[test]
    fn test_custom_rule_runs_after_standard_rules() {
        struct FlattenF2;
        impl Guardrail for FlattenF2 {
            fn id(&self) -> &'static str {
                "flatten-f2"
            }
            fn apply(&self, ratings: &mut RatingSet) -> Vec<GuardrailNote> {
                // Reads C2 after the standard rules have run.
                let c2 = ratings["C2"].band;
                ratings.get_mut("F2").unwrap().set_band(c2);
                vec![]
            }
        }

        let engine = GuardrailEngine::new().with_rule(FlattenF2);
        let mut ratings = ratings_with(&[("A2", 0), ("C2", 4), ("F2", 4)]);
        engine.apply(&mut ratings);
        assert_eq!(ratings["F2"].band, 2);
    }
}
