//! Data Cleaning - median imputation + z-score normalization
//!
//! Offline preprocessing of a raw measurement file. Only layout feature
//! columns are touched; everything else passes through.

use super::table::Dataset;

/// Median of the present values, `None` if there are none
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Replace missing cells with `fill`. Returns how many were filled.
pub fn impute(values: &mut [Option<f64>], fill: f64) -> usize {
    let mut filled = 0;
    for value in values.iter_mut().filter(|v| v.map_or(true, |x| !x.is_finite())) {
        *value = Some(fill);
        filled += 1;
    }
    filled
}

/// Population mean/std z-score. A constant column is only centred.
pub fn standardize(values: &mut [Option<f64>]) {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return;
    }
    let n = present.len() as f64;
    let mean = present.iter().sum::<f64>() / n;
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let scale = if std > 0.0 { std } else { 1.0 };

    for value in values.iter_mut().flatten() {
        *value = (*value - mean) / scale;
    }
}

/// What `process_dataset` did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSummary {
    pub missing_columns: Vec<&'static str>,
    pub processed_columns: Vec<&'static str>,
    pub imputed_cells: usize,
    /// Columns with no numeric value at all; left empty
    pub empty_columns: Vec<&'static str>,
}

/// Fill missing feature values with the column median, then normalize
pub fn process_dataset(mut dataset: Dataset) -> (Dataset, ProcessSummary) {
    let mut summary = ProcessSummary {
        missing_columns: dataset.missing_features(),
        ..Default::default()
    };

    if !summary.missing_columns.is_empty() {
        log::warn!("Missing expected columns: {:?}", summary.missing_columns);
    }

    for feature in dataset.available_features() {
        let Some(mut values) = dataset.numeric_column(feature) else {
            continue;
        };

        match median(&values) {
            Some(fill) => summary.imputed_cells += impute(&mut values, fill),
            None => {
                log::warn!("Column `{}` has no numeric values - left unfilled", feature);
                summary.empty_columns.push(feature);
                continue;
            }
        }

        standardize(&mut values);
        dataset.set_numeric_column(feature, &values);
        summary.processed_columns.push(feature);
    }

    log::info!(
        "Processed {} feature columns ({} cells imputed)",
        summary.processed_columns.len(),
        summary.imputed_cells
    );
    (dataset, summary)
}
