//! Pipeline errors
//!
//! Only dataset-level and artifact-level failures surface here; per-record
//! (missing value) and per-candidate (training) failures are contained where
//! they happen.

use std::path::PathBuf;

use crate::logic::model::ArtifactError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("dataset has no `{0}` column")]
    MissingLabelColumn(String),

    #[error("invalid label {value:?} in row {row} (expected 0 or 1)")]
    InvalidLabel { row: usize, value: String },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = PipelineError::InputNotFound(PathBuf::from("data/raw.csv"));
        assert_eq!(err.to_string(), "input not found: data/raw.csv");

        let err = PipelineError::InvalidLabel { row: 3, value: "2".into() };
        assert!(err.to_string().contains("row 3"));

        let err = PipelineError::Io {
            path: PathBuf::from("x.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("x.csv"));
    }
}
