//! The `ulpr-analyze` command: offline tools over band matrices.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ulpr_analysis::{
    apply_guardrails, conditional_summary, load_reports, read_matrix, write_matrix,
    CorrelationMatrix, DecisionTree, RuleSet, TreeParams, DEFAULT_THRESHOLDS,
};

use crate::logging::LoggingArgs;

#[derive(Parser, Debug)]
#[command(
    name = "ulpr-analyze",
    version,
    about = "Offline analysis of ULPR band matrices for checking guardrails"
)]
pub struct AnalyzeCli {
    #[command(subcommand)]
    pub cmd: AnalyzeCommand,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleSetArg {
    /// Single-letter columns (A..G)
    Letters,
    /// Rubric codes (A3, C3, ...)
    Codes,
}

impl From<RuleSetArg> for RuleSet {
    fn from(arg: RuleSetArg) -> Self {
        match arg {
            RuleSetArg::Letters => RuleSet::Letters,
            RuleSetArg::Codes => RuleSet::Codes,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AnalyzeCommand {
    /// Build a band matrix from a directory of JSON reports
    Load {
        #[arg(long, default_value = "../reports_json")]
        reports_dir: PathBuf,
        #[arg(long, default_value = "all_reports_bands.csv")]
        output: PathBuf,
    },
    /// Pearson correlation between criteria
    Correlate {
        #[arg(long, default_value = "rubric_converted.csv")]
        input: PathBuf,
        #[arg(long, default_value = "criteria_correlations.csv")]
        output: PathBuf,
    },
    /// Mean bands of all criteria when one criterion is below a threshold
    Thresholds {
        #[arg(long, default_value = "rubric_converted.csv")]
        input: PathBuf,
        /// COLUMN:THRESHOLD, repeatable [default: C:2 A:3 F:3]
        #[arg(long = "focus", value_parser = parse_focus)]
        focus: Vec<(String, f64)>,
    },
    /// Fit a small decision tree and print its rules
    Tree {
        #[arg(long, default_value = "rubric_converted.csv")]
        input: PathBuf,
        #[arg(long, default_value_t = 3)]
        max_depth: usize,
        #[arg(long, default_value_t = 2)]
        min_samples_split: usize,
    },
    /// Apply the column guardrails and add flag columns
    Guardrails {
        #[arg(long, default_value = "rubric_converted.csv")]
        input: PathBuf,
        #[arg(long, default_value = "all_reports_bands_guardrailed.csv")]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = RuleSetArg::Letters)]
        rules: RuleSetArg,
    },
}

/// Parse `COLUMN:THRESHOLD`.
pub fn parse_focus(value: &str) -> Result<(String, f64), String> {
    let (column, threshold) = value
        .split_once(':')
        .ok_or_else(|| format!("expected COLUMN:THRESHOLD, got '{}'", value))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column in '{}'", value));
    }
    let threshold = threshold
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid threshold in '{}': {}", value, e))?;
    Ok((column.to_string(), threshold))
}

/// Run one analysis subcommand, printing results to stdout.
pub fn run(cmd: AnalyzeCommand) -> Result<()> {
    match cmd {
        AnalyzeCommand::Load {
            reports_dir,
            output,
        } => {
            let matrix = load_reports(&reports_dir)?;
            println!("Loaded data:");
            println!("{}", matrix);
            write_matrix(&output, &matrix)?;
            println!("\nSaved band matrix to {}", output.display());
        }
        AnalyzeCommand::Correlate { input, output } => {
            let matrix = read_input(&input)?;
            println!("Loaded band data:");
            println!("{}", matrix);

            let corr = CorrelationMatrix::compute(&matrix);
            println!("\nCorrelation matrix:");
            println!("{}", corr);
            corr.write_csv(&output)?;
            println!("\nSaved correlation matrix to {}", output.display());
        }
        AnalyzeCommand::Thresholds { input, focus } => {
            let matrix = read_input(&input)?;
            let focus = if focus.is_empty() {
                DEFAULT_THRESHOLDS
                    .iter()
                    .map(|(column, t)| (column.to_string(), *t))
                    .collect()
            } else {
                focus
            };
            for (column, threshold) in &focus {
                let summary = conditional_summary(&matrix, column, *threshold)?;
                println!("\n{}", summary);
            }
        }
        AnalyzeCommand::Tree {
            input,
            max_depth,
            min_samples_split,
        } => {
            let matrix = read_input(&input)?;
            let tree = DecisionTree::fit_matrix(
                &matrix,
                TreeParams {
                    max_depth,
                    min_samples_split,
                },
            )?;
            println!("=== Decision tree rules (candidate guardrails) ===");
            println!("{}", tree.export_text());

            println!("\nFeature importances:");
            for (name, importance) in tree.feature_importances() {
                println!("{:<8} {:.6}", name, importance);
            }
        }
        AnalyzeCommand::Guardrails {
            input,
            output,
            rules,
        } => {
            let matrix = read_input(&input)?;
            println!("Original bands:");
            println!("{}", matrix);

            let guarded = apply_guardrails(&matrix, rules.into())?;
            println!("\nAdjusted bands + flags:");
            println!("{}", guarded);

            guarded.write_csv(&output)?;
            println!(
                "\nSaved adjusted scores with guardrails to {}",
                output.display()
            );
        }
    }
    Ok(())
}

fn read_input(path: &PathBuf) -> Result<ulpr_analysis::BandMatrix> {
    read_matrix(path).with_context(|| format!("reading band matrix {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    fn parse(args: &[&str]) -> AnalyzeCli {
        AnalyzeCli::try_parse_from(args).expect("parse should succeed")
    }

    #[test]
    fn test_cli_debug_assert() {
        AnalyzeCli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_defaults() {
        match parse(&["ulpr-analyze", "load"]).cmd {
            AnalyzeCommand::Load {
                reports_dir,
                output,
            } => {
                assert_eq!(reports_dir, PathBuf::from("../reports_json"));
                assert_eq!(output, PathBuf::from("all_reports_bands.csv"));
            }
            other => panic!("expected load, got {:?}", other),
        }

        match parse(&["ulpr-analyze", "tree"]).cmd {
            AnalyzeCommand::Tree {
                max_depth,
                min_samples_split,
                ..
            } => {
                assert_eq!(max_depth, 3);
                assert_eq!(min_samples_split, 2);
            }
            other => panic!("expected tree, got {:?}", other),
        }

        match parse(&["ulpr-analyze", "guardrails", "--rules", "codes", "-v"]) {
            AnalyzeCli {
                cmd: AnalyzeCommand::Guardrails { rules, .. },
                logging,
            } => {
                assert_eq!(rules, RuleSetArg::Codes);
                assert!(logging.verbose);
            }
            other => panic!("expected guardrails, got {:?}", other),
        }
    }

    #[test]
    fn test_focus_flags() {
        match parse(&["ulpr-analyze", "thresholds", "--focus", "C3:2", "--focus", "A:2.5"]).cmd {
            AnalyzeCommand::Thresholds { focus, .. } => {
                assert_eq!(focus, vec![("C3".to_string(), 2.0), ("A".to_string(), 2.5)]);
            }
            other => panic!("expected thresholds, got {:?}", other),
        }
        assert!(AnalyzeCli::try_parse_from(["ulpr-analyze", "thresholds", "--focus", "C3"]).is_err());
    }

    #[test]
    fn test_parse_focus() {
        assert_eq!(parse_focus("C:2"), Ok(("C".to_string(), 2.0)));
        assert!(parse_focus(":2").is_err());
        assert!(parse_focus("C:two").is_err());
    }

    #[test]
    fn test_load_then_guardrails() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("reports");
        fs::create_dir(&reports).unwrap();
        fs::write(
            reports.join("model-a.json"),
            r#"{"criteria": {"A1": {"band": 3}, "A3": {"band": 2}, "B1": {"band": 4}, "B3": {"band": 2},
                "C1": {"band": 4}, "C2": {"band": 4}, "C3": {"band": 1}, "D2": {"band": 4},
                "D3": {"band": 4}, "E1": {"band": 4}, "E3": {"band": 3}}}"#,
        )
        .unwrap();

        let bands = dir.path().join("bands.csv");
        run(AnalyzeCommand::Load {
            reports_dir: reports,
            output: bands.clone(),
        })
        .unwrap();
        assert!(fs::read_to_string(&bands)
            .unwrap()
            .starts_with("model,A1,A3,B1,B3,C1,C2,C3,D2,D3,E1,E3\nmodel-a,3,2,4,2,4,4,1,4,4,4,3\n"));

        let guarded = dir.path().join("guarded.csv");
        run(AnalyzeCommand::Guardrails {
            input: bands,
            output: guarded.clone(),
            rules: RuleSetArg::Codes,
        })
        .unwrap();

        let text = fs::read_to_string(&guarded).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("model-a,3,2,3,2,2,3,1,4,4,4,3,True,True,False,True,False,"));
    }

    #[test]
    fn test_letter_rules_on_code_columns_fail() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bands.csv");
        fs::write(&input, "model,A1,A2\nm,1,2\n").unwrap();

        let err = run(AnalyzeCommand::Guardrails {
            input,
            output: dir.path().join("out.csv"),
            rules: RuleSetArg::Letters,
        })
        .unwrap_err();
        assert!(err.to_string().contains("not in columns"));
    }

    #[test]
    fn test_missing_input_has_context() {
        let err = run(AnalyzeCommand::Tree {
            input: PathBuf::from("/nonexistent/rubric_converted.csv"),
            max_depth: 3,
            min_samples_split: 2,
        })
        .unwrap_err();
        assert!(format!("{:#}", err).contains("reading band matrix"));
    }
}
