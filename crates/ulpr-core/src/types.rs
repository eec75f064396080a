//! Core types shared across the scoring pipeline.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rubric::Criterion;

/// Highest band a criterion can be awarded.
pub const MAX_BAND: u8 = 4;

/// Rubric section, identified by the leading letter of a criterion code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Section {
    /// All sections in report order.
    pub const ALL: [Section; 6] = [
        Section::A,
        Section::B,
        Section::C,
        Section::D,
        Section::E,
        Section::F,
    ];

    /// Section for a criterion code such as `"C2"`.
    pub fn of_code(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'A' => Some(Section::A),
            'B' => Some(Section::B),
            'C' => Some(Section::C),
            'D' => Some(Section::D),
            'E' => Some(Section::E),
            'F' => Some(Section::F),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Section::A => 'A',
            Section::B => 'B',
            Section::C => 'C',
            Section::D => 'D',
            Section::E => 'E',
            Section::F => 'F',
        }
    }

    /// Human-readable section title used in reports.
    pub fn title(&self) -> &'static str {
        match self {
            Section::A => "Outcomes & Alignment",
            Section::B => "Engagement & Interaction",
            Section::C => "Retrieval & Assessment for Learning",
            Section::D => "Instructional Design & Scaffolding",
            Section::E => "Cognitive Load & Adaptation",
            Section::F => "Inclusivity, Culture & Reflection",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A rated criterion: the band chosen for one rubric code and its points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    /// Criterion code (e.g., "A1")
    pub code: String,

    /// Criterion name
    pub name: String,

    /// Weight contributed to the 100-point total
    pub weight: f64,

    /// Band 0-4
    pub band: u8,

    /// weight × band / 4
    pub points: f64,

    /// Evidence quoted or paraphrased by the rater
    pub evidence: String,

    /// Free-text rater notes
    pub notes: String,
}

impl Rating {
    /// Build a rating for a criterion. The band is clamped to 0-4.
    pub fn new(
        criterion: &Criterion,
        band: u8,
        evidence: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        let band = band.min(MAX_BAND);
        Self {
            code: criterion.code.to_string(),
            name: criterion.name.to_string(),
            weight: criterion.weight,
            band,
            points: points_for(criterion.weight, band),
            evidence: evidence.into(),
            notes: notes.into(),
        }
    }

    /// Change the band and recompute points.
    pub fn set_band(&mut self, band: u8) {
        self.band = band.min(MAX_BAND);
        self.points = points_for(self.weight, self.band);
    }

    pub fn section(&self) -> Option<Section> {
        Section::of_code(&self.code)
    }
}

/// Points awarded for a band: weight × band / 4.
pub fn points_for(weight: f64, band: u8) -> f64 {
    weight * f64::from(band) / f64::from(MAX_BAND)
}

/// Ratings keyed by criterion code. BTreeMap keeps code order deterministic.
pub type RatingSet = BTreeMap<String, Rating>;

/// A note emitted when a guardrail adjusts a band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuardrailNote {
    /// Identifier of the rule that fired
    pub rule_id: String,

    /// Code whose band was changed
    pub code: String,

    /// Band before the adjustment
    pub from_band: u8,

    /// Band after the adjustment
    pub to_band: u8,

    /// Human-readable message for the report
    pub message: String,
}

impl fmt::Display for GuardrailNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Weighted totals for a rating set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Totals {
    /// Sum of all points (0-100)
    pub total: f64,

    /// Subtotal per section; every section is present
    pub by_section: BTreeMap<Section, f64>,
}

impl Totals {
    /// Subtotal for one section.
    pub fn section(&self, section: Section) -> f64 {
        self.by_section.get(&section).copied().unwrap_or(0.0)
    }
}

/// The scored result of one lesson-plan evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scorecard {
    /// All rubric ratings after guardrails
    pub ratings: RatingSet,

    /// Adjustments applied by the guardrail engine, in order
    pub guardrail_notes: Vec<GuardrailNote>,

    /// Weighted totals
    pub totals: Totals,

    /// Codes the model omitted (defaulted to band 0)
    pub missing_codes: Vec<String>,

    /// The rater's global notes, if any
    pub global_notes: Option<String>,

    /// When the scorecard was produced
    pub evaluated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::criterion;

    #[test]
    fn test_section_of_code() {
        assert_eq!(Section::of_code("A1"), Some(Section::A));
        assert_eq!(Section::of_code("F2"), Some(Section::F));
        assert_eq!(Section::of_code("G1"), None);
        assert_eq!(Section::of_code(""), None);
    }

    #[test]
    fn test_rating_points() {
        let a2 = criterion("A2").unwrap();
        let rating = Rating::new(a2, 2, "", "");
        assert_eq!(rating.points, 4.5);
    }

    #[test]
    fn test_set_band_recomputes_points() {
        let b1 = criterion("B1").unwrap();
        let mut rating = Rating::new(b1, 4, "", "");
        assert_eq!(rating.points, 6.0);

        rating.set_band(1);
        assert_eq!(rating.band, 1);
        assert_eq!(rating.points, 1.5);
    }

    #[test]
    fn test_band_is_clamped() {
        let c1 = criterion("C1").unwrap();
        let rating = Rating::new(c1, 9, "", "");
        assert_eq!(rating.band, 4);
        assert_eq!(rating.points, 6.0);
    }
}
