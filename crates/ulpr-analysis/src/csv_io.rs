//! CSV reading and writing for band matrices.
//!
//! The first-class column is `model`; every other numeric column becomes a
//! matrix column. Empty cells are absent and `True`/`False` read as 1/0.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::matrix::BandMatrix;
use crate::AnalysisError;

/// Name of the index column.
pub const INDEX_COLUMN: &str = "model";

enum Cell {
    Value(Option<f64>),
    Text,
}

fn parse_cell(raw: &str) -> Cell {
    let raw = raw.trim();
    match raw {
        "" => Cell::Value(None),
        "True" | "true" | "TRUE" => Cell::Value(Some(1.0)),
        "False" | "false" | "FALSE" => Cell::Value(Some(0.0)),
        _ => match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => Cell::Value(None),
            Ok(v) => Cell::Value(Some(v)),
            Err(_) => Cell::Text,
        },
    }
}

/// Format a number the way it reads best in a CSV cell.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub(crate) fn format_cell(value: Option<f64>) -> String {
    value.map(format_value).unwrap_or_default()
}

/// Read a band matrix from any CSV source.
pub fn read_matrix_from<R: io::Read>(reader: R) -> Result<BandMatrix, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
    let headers = reader.headers()?.clone();

    let index = headers
        .iter()
        .position(|h| h.trim() == INDEX_COLUMN)
        .ok_or_else(|| AnalysisError::MissingIndex(INDEX_COLUMN.to_string()))?;

    let value_columns: Vec<usize> = (0..headers.len()).filter(|&i| i != index).collect();
    let mut numeric = vec![true; value_columns.len()];
    let mut models = Vec::new();
    let mut cells = Vec::new();

    for record in reader.records() {
        let record = record?;
        models.push(record.get(index).unwrap_or_default().trim().to_string());

        let row: Vec<Option<f64>> = value_columns
            .iter()
            .enumerate()
            .map(|(slot, &col)| match parse_cell(record.get(col).unwrap_or_default()) {
                Cell::Value(v) => v,
                Cell::Text => {
                    numeric[slot] = false;
                    None
                }
            })
            .collect();
        cells.push(row);
    }

    for (slot, &col) in value_columns.iter().enumerate() {
        if !numeric[slot] {
            tracing::warn!(column = &headers[col], "skipping non-numeric column");
        }
    }

    let keep: Vec<usize> = (0..value_columns.len()).filter(|&s| numeric[s]).collect();
    let columns = keep
        .iter()
        .map(|&s| headers[value_columns[s]].trim().to_string())
        .collect();
    let cells = cells
        .into_iter()
        .map(|row| keep.iter().map(|&s| row[s]).collect())
        .collect();

    BandMatrix::new(models, columns, cells)
}

/// Read a band matrix from a CSV file.
pub fn read_matrix(path: impl AsRef<Path>) -> Result<BandMatrix, AnalysisError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_matrix_from(file)
}

/// Write a band matrix to any CSV sink.
pub fn write_matrix_to<W: io::Write>(writer: W, matrix: &BandMatrix) -> Result<(), AnalysisError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![INDEX_COLUMN.to_string()];
    header.extend(matrix.columns().iter().cloned());
    writer.write_record(&header)?;

    for (model, row) in matrix.models().iter().zip(matrix.rows()) {
        let mut record = vec![model.clone()];
        record.extend(row.iter().map(|&v| format_cell(v)));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write a band matrix to a CSV file.
pub fn write_matrix(path: impl AsRef<Path>, matrix: &BandMatrix) -> Result<(), AnalysisError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_matrix_to(file, matrix)
}
