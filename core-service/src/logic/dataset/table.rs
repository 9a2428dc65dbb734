//! In-memory tabular dataset
//!
//! Cells are kept as the raw strings read from disk so columns the pipeline
//! does not touch are written back unchanged. Numeric access goes through
//! `parse_cell`.

use crate::logic::features::{MeasurementRecord, FEATURE_LAYOUT};

/// Parse a cell: empty, NaN or non-numeric cells are missing
pub fn parse_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Format a numeric value for writing; NaN becomes an empty cell
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Rows shorter or longer than the header are padded/truncated
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut dataset = Self::new(headers);
        for row in rows {
            dataset.push_row(row);
        }
        dataset
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Numeric view of a column; `None` if the column does not exist
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| parse_cell(&row[index])).collect())
    }

    /// Append a column. Panics if `values` does not have one entry per row.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) {
        assert_eq!(values.len(), self.rows.len(), "column length must match row count");
        self.headers.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Overwrite an existing column with numeric values. Returns `false` if absent.
    pub fn set_numeric_column(&mut self, name: &str, values: &[Option<f64>]) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value.map(format_value).unwrap_or_default();
        }
        true
    }

    /// Record over the named features that exist as columns.
    /// Names without a column stay absent from the record.
    pub fn record_for<'a>(&self, row: usize, features: impl IntoIterator<Item = &'a str>) -> MeasurementRecord {
        let mut record = MeasurementRecord::new();
        for feature in features {
            if let Some(index) = self.column_index(feature) {
                match self.rows.get(row).and_then(|r| parse_cell(&r[index])) {
                    Some(value) => record.set(feature, value),
                    None => record.set_missing(feature),
                }
            }
        }
        record
    }

    /// Record over the standard feature layout
    pub fn record(&self, row: usize) -> MeasurementRecord {
        self.record_for(row, FEATURE_LAYOUT.iter().copied())
    }

    /// Layout features with a column in this dataset
    pub fn available_features(&self) -> Vec<&'static str> {
        FEATURE_LAYOUT.iter().copied().filter(|f| self.has_column(f)).collect()
    }

    /// Layout features without a column in this dataset
    pub fn missing_features(&self) -> Vec<&'static str> {
        FEATURE_LAYOUT.iter().copied().filter(|f| !self.has_column(f)).collect()
    }
}
