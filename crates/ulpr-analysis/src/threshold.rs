//! Conditional means: how do other criteria look when one criterion is low?

use std::fmt;

use crate::matrix::{display_cell, mean, render_table, BandMatrix};
use crate::AnalysisError;

/// Focus columns and thresholds examined when none are given.
pub const DEFAULT_THRESHOLDS: [(&str, f64); 3] = [("C", 2.0), ("A", 3.0), ("F", 3.0)];

/// Group sizes and per-column means either side of a threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSummary {
    pub focus: String,
    pub threshold: f64,
    pub low_count: usize,
    pub high_count: usize,
    pub columns: Vec<String>,
    /// Means for rows where `focus < threshold`
    pub low_means: Vec<Option<f64>>,
    /// Means for every other row, including rows where `focus` is absent
    pub high_means: Vec<Option<f64>>,
}

/// Split rows on `focus < threshold` and average every column per group.
pub fn conditional_summary(
    matrix: &BandMatrix,
    focus: &str,
    threshold: f64,
) -> Result<ThresholdSummary, AnalysisError> {
    let focus_index = matrix.require_column(focus)?;

    let low: Vec<bool> = matrix
        .column(focus_index)
        .iter()
        .map(|v| v.is_some_and(|v| v < threshold))
        .collect();

    let group_means = |want_low: bool| -> Vec<Option<f64>> {
        (0..matrix.columns().len())
            .map(|col| {
                mean(
                    matrix
                        .rows()
                        .iter()
                        .zip(&low)
                        .filter(|&(_, &is_low)| is_low == want_low)
                        .filter_map(|(row, _)| row[col]),
                )
            })
            .collect()
    };

    let low_count = low.iter().filter(|&&l| l).count();
    let summary = ThresholdSummary {
        focus: focus.to_string(),
        threshold,
        low_count,
        high_count: low.len() - low_count,
        columns: matrix.columns().to_vec(),
        low_means: group_means(true),
        high_means: group_means(false),
    };

    tracing::debug!(
        focus,
        threshold,
        low = summary.low_count,
        high = summary.high_count,
        "threshold split"
    );

    Ok(summary)
}

impl ThresholdSummary {
    fn low_label(&self) -> String {
        format!("{} < {}", self.focus, self.threshold)
    }

    fn high_label(&self) -> String {
        format!("{} >= {}", self.focus, self.threshold)
    }
}

impl fmt::Display for ThresholdSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Threshold analysis for {} at {} ===",
            self.focus, self.threshold
        )?;
        writeln!(f, "Rows with {}: {}", self.low_label(), self.low_count)?;
        writeln!(f, "Rows with {}: {}", self.high_label(), self.high_count)?;
        writeln!(f)?;
        writeln!(f, "Mean bands of other criteria by group:")?;

        let rows: Vec<(String, Vec<String>)> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (
                    name.clone(),
                    vec![
                        display_cell(self.low_means[i], 2),
                        display_cell(self.high_means[i], 2),
                    ],
                )
            })
            .collect();
        f.write_str(&render_table(
            "",
            &[self.low_label(), self.high_label()],
            &rows,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BandMatrix {
        BandMatrix::new(
            vec!["m1".into(), "m2".into(), "m3".into(), "m4".into()],
            vec!["A".into(), "C".into()],
            vec![
                vec![Some(1.0), Some(1.0)],
                vec![Some(3.0), Some(3.0)],
                vec![Some(2.0), None],
                vec![Some(4.0), Some(4.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_split_counts_absent_as_not_low() {
        let summary = conditional_summary(&sample(), "C", 2.0).unwrap();
        assert_eq!(summary.low_count, 1);
        assert_eq!(summary.high_count, 3);
        assert_eq!(summary.low_means, vec![Some(1.0), Some(1.0)]);
        assert_eq!(summary.high_means, vec![Some(3.0), Some(3.5)]);
    }

    #[test]
    fn test_empty_group_has_no_means() {
        let summary = conditional_summary(&sample(), "A", 0.0).unwrap();
        assert_eq!(summary.low_count, 0);
        assert_eq!(summary.low_means, vec![None, None]);
    }

    #[test]
    fn test_unknown_focus_lists_columns() {
        let err = conditional_summary(&sample(), "G", 2.0).unwrap_err();
        assert_eq!(err.to_string(), r#"G not in columns: ["A", "C"]"#);
    }

    #[test]
    fn test_display() {
        let text = conditional_summary(&sample(), "C", 2.0).unwrap().to_string();
        assert!(text.starts_with("=== Threshold analysis for C at 2 ===\n"));
        assert!(text.contains("Rows with C < 2: 1\nRows with C >= 2: 3\n"));
        assert!(text.contains("C < 2  C >= 2"));
        assert!(text.contains("3.50"));
    }

    #[test]
    fn test_defaults() {
        let focus: Vec<&str> = DEFAULT_THRESHOLDS.iter().map(|(f, _)| *f).collect();
        assert_eq!(focus, vec!["C", "A", "F"]);
    }
}
