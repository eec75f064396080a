//! Weighted totals and report rendering.

mod markdown;

use std::collections::BTreeMap;

use crate::types::{RatingSet, Section, Totals};

pub use markdown::{format_markdown_report, MarkdownOptions, EXCERPT_CHARS};

/// Sum points overall and per section.
///
/// Every section appears in the result, with 0 when it has no ratings.
pub fn totals(ratings: &RatingSet) -> Totals {
    let mut by_section: BTreeMap<Section, f64> = Section::ALL.iter().map(|s| (*s, 0.0)).collect();
    let mut total = 0.0;

    for rating in ratings.values() {
        total += rating.points;
        if let Some(section) = rating.section() {
            *by_section.entry(section).or_insert(0.0) += rating.points;
        }
    }

    Totals { total, by_section }
}

/// Round to the nearest integer, ties to even.
pub fn round_points(value: f64) -> i64 {
    value.round_ties_even() as i64
}
