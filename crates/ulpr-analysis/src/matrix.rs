//! The band matrix: one row per model report, one column per criterion.

use std::collections::BTreeSet;
use std::fmt;

use crate::AnalysisError;

/// Rows of models by columns of criteria, with absent cells.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMatrix {
    models: Vec<String>,
    columns: Vec<String>,
    cells: Vec<Vec<Option<f64>>>,
}

impl BandMatrix {
    /// Build a matrix; model ids must be unique and every row must have one
    /// cell per column.
    pub fn new(
        models: Vec<String>,
        columns: Vec<String>,
        cells: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, AnalysisError> {
        if cells.len() != models.len() {
            return Err(AnalysisError::Shape(format!(
                "{} models but {} rows",
                models.len(),
                cells.len()
            )));
        }
        if let Some((i, row)) = cells
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(AnalysisError::Shape(format!(
                "row '{}' has {} cells, expected {}",
                models[i],
                row.len(),
                columns.len()
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = models.iter().find(|m| !seen.insert(m.as_str())) {
            return Err(AnalysisError::Shape(format!(
                "duplicate model id '{}'",
                duplicate
            )));
        }
        Ok(Self {
            models,
            columns,
            cells,
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column, or an error listing what exists.
    pub fn require_column(&self, name: &str) -> Result<usize, AnalysisError> {
        self.column_index(name)
            .ok_or_else(|| AnalysisError::UnknownColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// All values of one column, in row order.
    pub fn column(&self, index: usize) -> Vec<Option<f64>> {
        self.cells.iter().map(|row| row[index]).collect()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells[row][column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: Option<f64>) {
        self.cells[row][column] = value;
    }

    /// Mean of the present values among `columns` in one row.
    pub fn row_mean(&self, row: usize, columns: &[usize]) -> Option<f64> {
        mean(columns.iter().filter_map(|&c| self.cells[row][c]))
    }

    /// Indices of columns whose names start with one of `letters`.
    pub fn columns_starting_with(&self, letters: &[char]) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.chars().next().is_some_and(|c| letters.contains(&c)))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Mean of an iterator of values; `None` when it is empty.
pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Render a cell for a printed table.
pub(crate) fn display_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "NaN".to_string(),
    }
}

/// Right-aligned plain text table with a left label column.
pub(crate) fn render_table(
    corner: &str,
    headers: &[String],
    rows: &[(String, Vec<String>)],
) -> String {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .chain(std::iter::once(corner.chars().count()))
        .max()
        .unwrap_or(0);

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|(_, cells)| cells[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format!("{:<label_width$}", corner);
    for (header, width) in headers.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", header));
    }
    out.push('\n');

    for (label, cells) in rows {
        out.push_str(&format!("{:<label_width$}", label));
        for (cell, width) in cells.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell));
        }
        out.push('\n');
    }
    out
}

impl fmt::Display for BandMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<(String, Vec<String>)> = self
            .models
            .iter()
            .zip(&self.cells)
            .map(|(model, row)| {
                (
                    model.clone(),
                    row.iter().map(|&v| display_cell(v, 1)).collect(),
                )
            })
            .collect();
        f.write_str(&render_table("model", &self.columns, &rows))
    }
}
