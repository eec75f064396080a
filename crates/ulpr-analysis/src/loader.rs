//! Build a band matrix from a directory of saved JSON reports.
//!
//! Each `*.json` file is one model's report; the file stem names the row
//! and `criteria.<code>.band` fills the cells.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use ulpr_core::clamp_band;

use crate::matrix::BandMatrix;
use crate::AnalysisError;

/// JSON report files directly inside `dir`, sorted by path.
fn report_paths(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    let entries = fs::read_dir(dir).map_err(|source| AnalysisError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AnalysisError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Bands reported in one parsed report, keyed by code.
///
/// A criterion object without a band, or with a null one, keeps its key
/// with an absent value. Other bands are clamped to 0-4. Entries that are
/// not objects are skipped.
pub fn report_bands(report: &Value) -> BTreeMap<String, Option<f64>> {
    let Some(criteria) = report.get("criteria").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    criteria
        .iter()
        .filter(|(_, entry)| entry.is_object())
        .map(|(code, entry)| {
            let band = entry
                .get("band")
                .filter(|b| !b.is_null())
                .map(|b| f64::from(clamp_band(b)));
            (code.clone(), band)
        })
        .collect()
}

/// Load every JSON report in `dir` into a band matrix.
///
/// Columns are the union of reported codes in sorted order; rows are sorted
/// by model name.
pub fn load_reports(dir: impl AsRef<Path>) -> Result<BandMatrix, AnalysisError> {
    let dir = dir.as_ref();
    let paths = report_paths(dir)?;
    if paths.is_empty() {
        return Err(AnalysisError::NoReports(dir.to_path_buf()));
    }

    let mut rows: BTreeMap<String, BTreeMap<String, Option<f64>>> = BTreeMap::new();
    let mut columns = BTreeSet::new();

    for path in &paths {
        let text = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.clone(),
            source,
        })?;
        let report: Value = serde_json::from_str(&text).map_err(|source| AnalysisError::Json {
            path: path.clone(),
            source,
        })?;

        let model = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bands = report_bands(&report);
        if bands.is_empty() {
            tracing::warn!(path = %path.display(), "report has no criteria bands");
        }
        columns.extend(bands.keys().cloned());
        rows.insert(model, bands);
    }

    let columns: Vec<String> = columns.into_iter().collect();
    let (models, cells): (Vec<String>, Vec<Vec<Option<f64>>>) = rows
        .into_iter()
        .map(|(model, bands)| {
            let row = columns.iter().map(|c| bands.get(c).copied().flatten()).collect();
            (model, row)
        })
        .unzip();

    tracing::info!(
        reports = paths.len(),
        criteria = columns.len(),
        dir = %dir.display(),
        "loaded band matrix"
    );

    BandMatrix::new(models, columns, cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_report_bands_clamps_and_keeps_null() {
        let bands = report_bands(&json!({
            "criteria": {
                "A1": {"band": 7},
                "A2": {"band": null},
                "B1": {"evidence": "none"},
                "C1": {"band": "3"},
                "D1": "not an object"
            }
        }));
        assert_eq!(bands.len(), 4);
        assert_eq!(bands["A1"], Some(4.0));
        assert_eq!(bands["A2"], None);
        assert_eq!(bands["B1"], None);
        assert_eq!(bands["C1"], Some(3.0));
        assert!(!bands.contains_key("D1"));
    }

    #[test]
    fn test_load_reports() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "zeta.json",
            r#"{"criteria": {"B1": {"band": 2}, "A1": {"band": 3}}}"#,
        );
        write(
            dir.path(),
            "alpha.json",
            r#"{"criteria": {"A1": {"band": 1}, "C2": {"band": 4}}}"#,
        );
        write(dir.path(), "notes.txt", "ignored");

        let matrix = load_reports(dir.path()).unwrap();
        assert_eq!(matrix.models(), &["alpha", "zeta"]);
        assert_eq!(matrix.columns(), &["A1", "B1", "C2"]);
        assert_eq!(matrix.rows()[0], vec![Some(1.0), None, Some(4.0)]);
        assert_eq!(matrix.rows()[1], vec![Some(3.0), Some(2.0), None]);
    }

    #[test]
    fn test_unbanded_criterion_keeps_column() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "m1.json",
            r#"{"criteria": {"A1": {"band": 2}, "F2": {"evidence": "none"}}}"#,
        );
        write(
            dir.path(),
            "m2.json",
            r#"{"criteria": {"A1": {"band": 4}, "F2": {"band": null}}}"#,
        );

        let matrix = load_reports(dir.path()).unwrap();
        assert_eq!(matrix.columns(), &["A1", "F2"]);
        assert_eq!(matrix.rows()[0], vec![Some(2.0), None]);
        assert_eq!(matrix.rows()[1], vec![Some(4.0), None]);

        let summary = crate::conditional_summary(&matrix, "F2", 3.0).unwrap();
        assert_eq!(summary.low_count, 0);
        assert_eq!(summary.high_count, 2);
    }

    #[test]
    fn test_empty_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "readme.md", "# nothing here");

        match load_reports(dir.path()) {
            Err(AnalysisError::NoReports(path)) => assert_eq!(path, dir.path()),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken.json", "{not json");

        let err = load_reports(dir.path()).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            load_reports("/nonexistent/reports_json"),
            Err(AnalysisError::Io { .. })
        ));
    }
}
