//! Summary report - row/column counts and per-column descriptive statistics

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::logic::error::{PipelineError, Result};
use super::table::{parse_cell, Dataset};

/// count / mean / std / min / quartiles / max of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN for a single value
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

impl ColumnStats {
    pub fn compute(name: &str, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let std = if sorted.len() > 1 {
            (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            name: name.to_string(),
            count: sorted.len(),
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Statistics for every numeric column.
/// A column is numeric when each non-empty cell parses as a number.
pub fn describe(dataset: &Dataset) -> Vec<ColumnStats> {
    let mut stats = Vec::new();

    for (index, name) in dataset.headers().iter().enumerate() {
        let mut values = Vec::with_capacity(dataset.n_rows());
        let mut numeric = true;

        for row in dataset.rows() {
            let cell = row[index].trim();
            if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
                continue;
            }
            match parse_cell(cell) {
                Some(v) => values.push(v),
                None => {
                    numeric = false;
                    break;
                }
            }
        }

        if numeric {
            if let Some(column) = ColumnStats::compute(name, &values) {
                stats.push(column);
            }
        }
    }

    stats
}

/// Render the text report
pub fn render_report(dataset: &Dataset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, " Groundwater Data Summary");
    let _ = writeln!(out, "{}", "=".repeat(40));
    let _ = writeln!(out);
    let _ = writeln!(out, "Rows: {}, Columns: {}", dataset.n_rows(), dataset.n_columns());
    let _ = writeln!(out);
    let _ = writeln!(out, "Statistics:");

    let stats = describe(dataset);
    if stats.is_empty() {
        let _ = writeln!(out, "(no numeric columns)");
        return out;
    }

    let _ = write!(out, "{:<8}", "");
    for column in &stats {
        let _ = write!(out, "{:>14}", column.name);
    }
    let _ = writeln!(out);

    let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
        ("count", |c| c.count as f64),
        ("mean", |c| c.mean),
        ("std", |c| c.std),
        ("min", |c| c.min),
        ("25%", |c| c.q25),
        ("50%", |c| c.median),
        ("75%", |c| c.q75),
        ("max", |c| c.max),
    ];
    for (label, value) in rows {
        let _ = write!(out, "{:<8}", label);
        for column in &stats {
            let _ = write!(out, "{:>14.6}", value(column));
        }
        let _ = writeln!(out);
    }

    out
}

/// Write the report to `path`
pub fn write_report(dataset: &Dataset, path: &Path) -> Result<()> {
    fs::write(path, render_report(dataset)).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved report → {}", path.display());
    Ok(())
}
