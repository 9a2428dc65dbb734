use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::logic::error::{PipelineError, Result};
use super::table::Dataset;

/// Load a CSV dataset with a header row.
/// A path that does not resolve is `InputNotFound`, checked before any parsing.
/// Short rows are padded with empty (missing) cells; only headers are trimmed.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound(path.to_path_buf()));
    }

    let csv_err = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(String::from)
        .collect();

    let mut dataset = Dataset::new(headers);
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        dataset.push_row(record.iter().map(String::from).collect());
    }

    log::info!(
        "Loaded dataset {} with shape ({}, {})",
        path.display(),
        dataset.n_rows(),
        dataset.n_columns()
    );
    Ok(dataset)
}
