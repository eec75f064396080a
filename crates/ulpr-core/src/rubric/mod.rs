//! The Unified Lesson Plan Rubric.
//!
//! Seventeen criteria grouped into six sections. Weights sum to 100 and
//! every criterion is rated on the same 0-4 band scale.

mod criteria;

use serde::Serialize;

use crate::types::Section;

pub use criteria::ULPR_CRITERIA;

/// Generic band definitions shared by every criterion.
pub const BAND_DEFS: [&str; 5] = [
    "0 – Not evident / harmful / misaligned.",
    "1 – Minimal: token, ad-hoc, or unclear; unlikely to impact learning.",
    "2 – Adequate/Developing: present with gaps; partial quality or alignment.",
    "3 – Strong: clear, intentional, and consistent design.",
    "4 – Exemplary: comprehensive, explicit, with routines/tools and verification.",
];

/// One rubric criterion.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Criterion {
    /// Two-character code (e.g., "A1")
    pub code: &'static str,

    /// Short name
    pub name: &'static str,

    /// Contribution to the 100-point total
    pub weight: f64,

    /// What the rater should look for
    pub description: &'static str,

    /// Criterion-specific notes for bands 0 through 4
    pub band_notes: [&'static str; 5],

    /// Traceability to the source metrics the criterion merges
    pub sources: &'static [&'static str],
}

impl Criterion {
    pub fn section(&self) -> Option<Section> {
        Section::of_code(self.code)
    }
}

/// All criteria in code order.
pub fn criteria() -> &'static [Criterion] {
    &ULPR_CRITERIA
}

/// Look up a criterion by code.
pub fn criterion(code: &str) -> Option<&'static Criterion> {
    ULPR_CRITERIA.iter().find(|c| c.code == code)
}

/// All criterion codes in order.
pub fn codes() -> impl Iterator<Item = &'static str> {
    ULPR_CRITERIA.iter().map(|c| c.code)
}

/// Sum of all weights.
pub fn total_weight() -> f64 {
    ULPR_CRITERIA.iter().map(|c| c.weight).sum()
}

/// Sum of weights within one section.
pub fn section_weight(section: Section) -> f64 {
    ULPR_CRITERIA
        .iter()
        .filter(|c| c.section() == Some(section))
        .map(|c| c.weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seventeen_criteria() {
        assert_eq!(criteria().len(), 17);
    }

    #[test]
    fn test_weights_sum_to_100() {
        assert_eq!(total_weight(), 100.0);
    }

    #[test]
    fn test_section_weights() {
        assert_eq!(section_weight(Section::A), 25.0);
        assert_eq!(section_weight(Section::B), 20.0);
        assert_eq!(section_weight(Section::C), 20.0);
        assert_eq!(section_weight(Section::D), 15.0);
        assert_eq!(section_weight(Section::E), 12.0);
        assert_eq!(section_weight(Section::F), 8.0);
    }

    #[test]
    fn test_codes_unique_and_ordered() {
        let all: Vec<&str> = codes().collect();
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(all, sorted);
    }

    #[test]
    fn test_every_code_has_a_section() {
        for c in criteria() {
            assert!(c.section().is_some(), "no section for {}", c.code);
            assert_eq!(c.code.len(), 2);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(criterion("E3").unwrap().weight, 4.0);
        assert!(criterion("G1").is_none());
    }
}
