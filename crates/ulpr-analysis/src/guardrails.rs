//! Column-level guardrails over a band matrix.
//!
//! Each rule looks at one trigger column and, for rows where it is below a
//! limit, caps other columns and raises a boolean flag. Rules run in order
//! and each sees the values left by the previous ones. Rows whose trigger
//! is absent are never flagged.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::csv_io::{format_cell, INDEX_COLUMN};
use crate::matrix::{display_cell, render_table, BandMatrix};
use crate::AnalysisError;

/// Letters whose columns feed the overall mean.
const MEAN_LETTERS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// One trigger-and-cap rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixRule {
    pub flag: &'static str,
    pub trigger: &'static str,
    /// Rows with `trigger < below` are affected.
    pub below: f64,
    pub caps: &'static [(&'static str, f64)],
}

const LETTER_RULES: [MatrixRule; 5] = [
    MatrixRule {
        flag: "flag_sequencing_issue",
        trigger: "A",
        below: 3.0,
        caps: &[],
    },
    MatrixRule {
        flag: "flag_retrieval_guardrail",
        trigger: "E",
        below: 2.0,
        caps: &[("C", 2.0), ("D", 3.0)],
    },
    MatrixRule {
        flag: "flag_scaffolding_guardrail",
        trigger: "D",
        below: 3.0,
        caps: &[("E", 2.0)],
    },
    MatrixRule {
        flag: "flag_engagement_guardrail",
        trigger: "C",
        below: 3.0,
        caps: &[("B", 3.0)],
    },
    MatrixRule {
        flag: "flag_load_guardrail",
        trigger: "G",
        below: 2.0,
        caps: &[("E", 3.0)],
    },
];

const CODE_RULES: [MatrixRule; 5] = [
    MatrixRule {
        flag: "flag_sequencing_issue",
        trigger: "A3",
        below: 3.0,
        caps: &[],
    },
    MatrixRule {
        flag: "flag_retrieval_guardrail",
        trigger: "C3",
        below: 2.0,
        caps: &[("C1", 2.0), ("C2", 3.0)],
    },
    MatrixRule {
        flag: "flag_scaffolding_guardrail",
        trigger: "D2",
        below: 3.0,
        caps: &[("D3", 2.0)],
    },
    MatrixRule {
        flag: "flag_engagement_guardrail",
        trigger: "B3",
        below: 3.0,
        caps: &[("B1", 3.0)],
    },
    MatrixRule {
        flag: "flag_load_guardrail",
        trigger: "E3",
        below: 2.0,
        caps: &[("E1", 3.0)],
    },
];

/// Which column naming the rules address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSet {
    /// Single-letter columns, as in converted rubric sheets.
    #[default]
    Letters,
    /// Two-character rubric codes such as `C3`.
    Codes,
}

impl RuleSet {
    pub fn rules(&self) -> &'static [MatrixRule] {
        match self {
            RuleSet::Letters => &LETTER_RULES,
            RuleSet::Codes => &CODE_RULES,
        }
    }
}

impl FromStr for RuleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "letters" => Ok(RuleSet::Letters),
            "codes" => Ok(RuleSet::Codes),
            other => Err(format!("unknown rule set '{}', expected letters or codes", other)),
        }
    }
}

/// Adjusted matrix plus one flag column per rule and the recomputed mean.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardedMatrix {
    pub adjusted: BandMatrix,
    pub flags: Vec<(String, Vec<bool>)>,
    pub overall_mean: Vec<Option<f64>>,
}

/// Apply a rule set to a copy of `matrix`.
pub fn apply_guardrails(matrix: &BandMatrix, rules: RuleSet) -> Result<GuardedMatrix, AnalysisError> {
    let rules = rules.rules();
    for rule in rules {
        matrix.require_column(rule.trigger)?;
        for (column, _) in rule.caps {
            matrix.require_column(column)?;
        }
    }

    let mut adjusted = matrix.clone();
    let mut flags = Vec::with_capacity(rules.len());

    for rule in rules {
        let trigger = adjusted.require_column(rule.trigger)?;
        let hits: Vec<bool> = adjusted
            .column(trigger)
            .iter()
            .map(|v| v.is_some_and(|v| v < rule.below))
            .collect();

        for &(column, max) in rule.caps {
            let col = adjusted.require_column(column)?;
            for (row, _) in hits.iter().enumerate().filter(|&(_, &hit)| hit) {
                if let Some(v) = adjusted.get(row, col) {
                    adjusted.set(row, col, Some(v.min(max)));
                }
            }
        }

        tracing::debug!(
            flag = rule.flag,
            rows = hits.iter().filter(|&&h| h).count(),
            "guardrail applied"
        );
        flags.push((rule.flag.to_string(), hits));
    }

    let mean_cols = matrix.columns_starting_with(&MEAN_LETTERS);
    let overall_mean = (0..adjusted.models().len())
        .map(|row| adjusted.row_mean(row, &mean_cols))
        .collect();

    Ok(GuardedMatrix {
        adjusted,
        flags,
        overall_mean,
    })
}

fn bool_cell(flag: bool) -> String {
    let text = if flag { "True" } else { "False" };
    text.to_string()
}

impl GuardedMatrix {
    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = self.adjusted.columns().to_vec();
        header.extend(self.flags.iter().map(|(name, _)| name.clone()));
        header.push("overall_mean_after_guardrails".to_string());
        header
    }

    fn row_cells(&self, row: usize, format: impl Fn(Option<f64>) -> String) -> Vec<String> {
        let mut cells: Vec<String> = self.adjusted.rows()[row].iter().map(|&v| format(v)).collect();
        cells.extend(self.flags.iter().map(|(_, hits)| bool_cell(hits[row])));
        cells.push(format(self.overall_mean[row]));
        cells
    }

    /// Write as CSV indexed by `model`, flags as `True`/`False`.
    pub fn write_csv_to<W: io::Write>(&self, writer: W) -> Result<(), AnalysisError> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![INDEX_COLUMN.to_string()];
        header.extend(self.header());
        writer.write_record(&header)?;

        for (row, model) in self.adjusted.models().iter().enumerate() {
            let mut record = vec![model.clone()];
            record.extend(self.row_cells(row, format_cell));
            writer.write_record(&record)?;
        }

        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write as a CSV file.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), AnalysisError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_csv_to(file)
    }
}

impl fmt::Display for GuardedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<(String, Vec<String>)> = self
            .adjusted
            .models()
            .iter()
            .enumerate()
            .map(|(row, model)| (model.clone(), self.row_cells(row, |v| display_cell(v, 2))))
            .collect();
        f.write_str(&render_table(INDEX_COLUMN, &self.header(), &rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(rows: Vec<Vec<Option<f64>>>) -> BandMatrix {
        let models = (0..rows.len()).map(|i| format!("m{}", i)).collect();
        let columns = ["A", "B", "C", "D", "E", "F", "G"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        BandMatrix::new(models, columns, rows).unwrap()
    }

    fn row(values: [f64; 7]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn flag<'a>(guarded: &'a GuardedMatrix, name: &str) -> &'a [bool] {
        &guarded
            .flags
            .iter()
            .find(|(n, _)| n == name)
            .unwrap()
            .1
    }

    #[test]
    fn test_all_high_untouched() {
        let m = letters(vec![row([4.0; 7])]);
        let guarded = apply_guardrails(&m, RuleSet::Letters).unwrap();

        assert_eq!(guarded.adjusted, m);
        assert!(guarded.flags.iter().all(|(_, hits)| !hits[0]));
        assert_eq!(guarded.overall_mean, vec![Some(4.0)]);
    }

    #[test]
    fn test_retrieval_rule_caps_c_and_d() {
        let m = letters(vec![row([4.0, 4.0, 4.0, 4.0, 1.0, 4.0, 4.0])]);
        let guarded = apply_guardrails(&m, RuleSet::Letters).unwrap();

        let a = &guarded.adjusted;
        assert_eq!(a.get(0, 2), Some(2.0));
        assert_eq!(a.get(0, 3), Some(3.0));
        assert!(flag(&guarded, "flag_retrieval_guardrail")[0]);
        // D was capped to 3, which is not below 3.
        assert!(!flag(&guarded, "flag_scaffolding_guardrail")[0]);
        // C was capped to 2, so engagement caps B.
        assert_eq!(a.get(0, 1), Some(3.0));
        assert!(flag(&guarded, "flag_engagement_guardrail")[0]);
        assert!(!flag(&guarded, "flag_sequencing_issue")[0]);
    }

    #[test]
    fn test_load_rule_and_mean_excludes_g() {
        let m = letters(vec![row([3.0, 3.0, 3.0, 3.0, 4.0, 3.0, 1.0])]);
        let guarded = apply_guardrails(&m, RuleSet::Letters).unwrap();

        assert_eq!(guarded.adjusted.get(0, 4), Some(3.0));
        assert!(flag(&guarded, "flag_load_guardrail")[0]);
        assert_eq!(guarded.overall_mean, vec![Some(3.0)]);
    }

    #[test]
    fn test_absent_trigger_never_fires() {
        let mut values = row([1.0; 7]);
        values[0] = None;
        let m = letters(vec![values]);
        let guarded = apply_guardrails(&m, RuleSet::Letters).unwrap();
        assert!(!flag(&guarded, "flag_sequencing_issue")[0]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let m = BandMatrix::new(
            vec!["m".into()],
            vec!["A".into(), "B".into()],
            vec![vec![Some(1.0), Some(1.0)]],
        )
        .unwrap();
        assert!(matches!(
            apply_guardrails(&m, RuleSet::Letters),
            Err(AnalysisError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_code_rules() {
        let codes = [
            "A1", "A2", "A3", "B1", "B2", "B3", "C1", "C2", "C3", "D1", "D2", "D3", "E1", "E2", "E3",
            "F1", "F2",
        ];
        let mut cells = vec![Some(4.0); codes.len()];
        let c3 = codes.iter().position(|c| *c == "C3").unwrap();
        cells[c3] = Some(1.0);
        let m = BandMatrix::new(
            vec!["m".into()],
            codes.iter().map(|c| c.to_string()).collect(),
            vec![cells],
        )
        .unwrap();

        let guarded = apply_guardrails(&m, RuleSet::Codes).unwrap();
        let c1 = m.column_index("C1").unwrap();
        let c2 = m.column_index("C2").unwrap();
        assert_eq!(guarded.adjusted.get(0, c1), Some(2.0));
        assert_eq!(guarded.adjusted.get(0, c2), Some(3.0));
        assert!(flag(&guarded, "flag_retrieval_guardrail")[0]);
        assert!(!flag(&guarded, "flag_load_guardrail")[0]);
    }

    #[test]
    fn test_csv_output() {
        let m = letters(vec![row([2.0, 4.0, 4.0, 4.0, 4.0, 4.0, 4.0])]);
        let guarded = apply_guardrails(&m, RuleSet::Letters).unwrap();

        let mut out = Vec::new();
        guarded.write_csv_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "model,A,B,C,D,E,F,G,flag_sequencing_issue,flag_retrieval_guardrail,\
             flag_scaffolding_guardrail,flag_engagement_guardrail,flag_load_guardrail,\
             overall_mean_after_guardrails"
        );
        assert_eq!(
            lines.next().unwrap(),
            "m0,2,4,4,4,4,4,4,True,False,False,False,False,3.6666666666666665"
        );
    }

    #[test]
    fn test_rule_set_parse() {
        assert_eq!("codes".parse::<RuleSet>().unwrap(), RuleSet::Codes);
        assert_eq!("letters".parse::<RuleSet>().unwrap(), RuleSet::Letters);
        assert!("both".parse::<RuleSet>().is_err());
    }
}
