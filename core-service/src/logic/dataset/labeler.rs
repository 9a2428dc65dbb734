//! Dataset Labeler
//!
//! Applies the rule engine row by row and appends the `safe_water` column.
//! Labels come from raw values: this runs before any imputation.

use crate::constants::LABEL_COLUMN;
use crate::logic::error::{PipelineError, Result};
use crate::logic::threshold::{classify, violations, SafetyLabel, ThresholdTable};

use super::table::{parse_cell, Dataset};

/// Table features without a column in the dataset.
/// They are dropped from evaluation for every row.
pub fn missing_threshold_columns<'a>(dataset: &Dataset, thresholds: &'a ThresholdTable) -> Vec<&'a str> {
    thresholds.features().filter(|f| !dataset.has_column(f)).collect()
}

/// Append `safe_water` (1 = safe, 0 = unsafe).
///
/// A dataset that already carries the column is returned untouched, so
/// re-running on labeled output is a no-op.
pub fn label_dataset(dataset: Dataset, thresholds: &ThresholdTable) -> Dataset {
    if dataset.has_column(LABEL_COLUMN) {
        log::info!("Dataset already has `{}` column - labeling skipped", LABEL_COLUMN);
        return dataset;
    }

    let missing = missing_threshold_columns(&dataset, thresholds);
    if !missing.is_empty() {
        log::warn!(
            "Missing expected columns {:?} - dropped from threshold evaluation",
            missing
        );
    }

    let evaluated: Vec<&str> = thresholds.features().filter(|f| dataset.has_column(f)).collect();
    let trace = log::log_enabled!(log::Level::Debug);

    let mut safe_count = 0usize;
    let labels: Vec<String> = (0..dataset.n_rows())
        .map(|row| {
            let record = dataset.record_for(row, evaluated.iter().copied());
            let label = classify(&record, thresholds);
            if label.is_safe() {
                safe_count += 1;
            } else if trace {
                let reasons: Vec<String> = violations(&record, thresholds)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                log::debug!("Row {} unsafe: {}", row, reasons.join(", "));
            }
            label.encoded().to_string()
        })
        .collect();

    log::info!(
        "Target column added: {} rows ({} safe, {} unsafe)",
        labels.len(),
        safe_count,
        labels.len() - safe_count
    );

    let mut labeled = dataset;
    labeled.push_column(LABEL_COLUMN, labels);
    labeled
}

/// Decode the label column. Accepts any numeric spelling of 0 or 1 ("1", "1.0").
pub fn read_labels(dataset: &Dataset) -> Result<Vec<SafetyLabel>> {
    let index = dataset
        .column_index(LABEL_COLUMN)
        .ok_or_else(|| PipelineError::MissingLabelColumn(LABEL_COLUMN.to_string()))?;

    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let raw = &cells[index];
            parse_cell(raw)
                .and_then(|v| match v {
                    v if v == 0.0 => Some(SafetyLabel::Unsafe),
                    v if v == 1.0 => Some(SafetyLabel::Safe),
                    _ => None,
                })
                .ok_or_else(|| PipelineError::InvalidLabel {
                    row,
                    value: raw.clone(),
                })
        })
        .collect()
}
