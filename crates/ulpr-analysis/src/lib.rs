//! # ulpr-analysis
//!
//! Offline analysis of many ULPR reports at once, used to check whether the
//! guardrails match how models actually rate plans.
//!
//! Everything operates on a [`BandMatrix`] (models by criteria):
//! - [`loader`] builds one from a directory of JSON reports
//! - [`csv_io`] reads and writes it as CSV indexed by `model`
//! - [`correlation`], [`threshold`] and [`tree`] look for relationships
//!   between criteria
//! - [`guardrails`] applies the column-level guardrail variant and adds flags
//!
//! All of it is deterministic; no model is called.

pub mod correlation;
pub mod csv_io;
pub mod guardrails;
pub mod loader;
pub mod matrix;
pub mod threshold;
pub mod tree;

pub use correlation::{pearson, CorrelationMatrix};
pub use csv_io::{read_matrix, write_matrix};
pub use guardrails::{apply_guardrails, GuardedMatrix, RuleSet};
pub use loader::load_reports;
pub use matrix::BandMatrix;
pub use threshold::{conditional_summary, ThresholdSummary, DEFAULT_THRESHOLDS};
pub use tree::{DecisionTree, TreeParams};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the analysis tools.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No JSON files found in {}", .0.display())]
    NoReports(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV has no '{0}' index column")]
    MissingIndex(String),

    #[error("{column} not in columns: {available:?}")]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Malformed band matrix: {0}")]
    Shape(String),

    #[error("Cannot fit a decision tree without rows and feature columns")]
    EmptyTrainingSet,
}
