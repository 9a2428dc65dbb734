use std::fs;
use std::path::Path;

use csv::WriterBuilder;

use crate::logic::error::{PipelineError, Result};
use super::table::Dataset;

/// Write the dataset as CSV (header + rows), replacing any existing file
pub fn save_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source: csv::Error| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new().from_path(path).map_err(csv_err)?;
    writer.write_record(dataset.headers()).map_err(csv_err)?;
    for row in dataset.rows() {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Saved dataset → {}", path.display());
    Ok(())
}
