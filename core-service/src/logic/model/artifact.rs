//! Model Artifact - versioned, checksummed envelope around a fitted pipeline
//!
//! Written as JSON to a temporary sibling and renamed into place, so readers
//! never observe a half-written artifact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::metrics::ClassificationReport;
use super::pipeline::{CandidateKind, FittedPipeline};
use crate::logic::features::{layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("model artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("artifact checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("artifact pipeline expects {actual} features, layout has {expected}")]
    FeatureCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub model_name: String,
    pub kind: CandidateKind,
    /// Unix timestamp
    pub created_at: i64,
    /// Evaluation of the selected candidate on the held-out rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<ClassificationReport>,
    /// SHA-256 (hex) of the serialized pipeline
    pub checksum: String,
    pub pipeline: FittedPipeline,
}

fn pipeline_checksum(pipeline: &FittedPipeline) -> Result<String, ArtifactError> {
    let payload = serde_json::to_vec(pipeline)?;
    let mut hasher = Sha256::new();
    hasher.update(&payload);
    Ok(hex::encode(hasher.finalize()))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl ModelArtifact {
    pub fn new(
        pipeline: FittedPipeline,
        evaluation: Option<ClassificationReport>,
    ) -> Result<Self, ArtifactError> {
        Ok(Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            model_name: pipeline.kind.name().to_string(),
            kind: pipeline.kind,
            created_at: chrono::Utc::now().timestamp(),
            evaluation,
            checksum: pipeline_checksum(&pipeline)?,
            pipeline,
        })
    }

    /// Layout, feature count and checksum all match the running build
    pub fn verify(&self) -> Result<(), ArtifactError> {
        validate_layout(self.feature_version, self.layout_hash)?;

        let n_features = self.pipeline.n_features();
        if n_features != FEATURE_COUNT {
            return Err(ArtifactError::FeatureCount {
                expected: FEATURE_COUNT,
                actual: n_features,
            });
        }

        let actual = pipeline_checksum(&self.pipeline)?;
        if actual != self.checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(self)?;
        let tmp = temp_sibling(path);
        if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        log::info!("Saved {} artifact to {}", self.model_name, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let data = fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&data)?;
        artifact.verify()?;

        log::debug!(
            "Loaded {} artifact (layout v{} {:08x})",
            artifact.model_name,
            artifact.feature_version,
            artifact.layout_hash
        );
        Ok(artifact)
    }
}
