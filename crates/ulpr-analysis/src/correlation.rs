//! Pairwise Pearson correlation between criteria.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::csv_io::format_cell;
use crate::matrix::{display_cell, render_table, BandMatrix};
use crate::AnalysisError;

/// Pearson correlation over the positions where both series are present.
///
/// `None` with fewer than two complete pairs or when either side has no
/// variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Square matrix of correlations, columns in matrix order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlate every pair of columns.
    pub fn compute(matrix: &BandMatrix) -> Self {
        let series: Vec<Vec<Option<f64>>> = (0..matrix.columns().len())
            .map(|i| matrix.column(i))
            .collect();

        let values = series
            .iter()
            .map(|a| series.iter().map(|b| pearson(a, b)).collect())
            .collect();

        Self {
            columns: matrix.columns().to_vec(),
            values,
        }
    }

    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Write as CSV with an unnamed index column.
    pub fn write_csv_to<W: io::Write>(&self, writer: W) -> Result<(), AnalysisError> {
        let mut writer = csv::Writer::from_writer(writer);

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;

        for (name, row) in self.columns.iter().zip(&self.values) {
            let mut record = vec![name.clone()];
            record.extend(row.iter().map(|&v| format_cell(v)));
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

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<(String, Vec<String>)> = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(name, row)| {
                (
                    name.clone(),
                    row.iter().map(|&v| display_cell(v, 3)).collect(),
                )
            })
            .collect();
        f.write_str(&render_table("", &self.columns, &rows))
    }
}
