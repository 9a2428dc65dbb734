//! Inference Engine - serves predictions from a deployed artifact
//!
//! Read-only after load. Latency counters are atomics so one instance can be
//! shared across request handlers behind an `Arc`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use super::artifact::{ArtifactError, ModelArtifact};
use super::pipeline::CandidateKind;
use crate::logic::features::{FeatureVector, MeasurementRecord, MissingFeature};
use crate::logic::threshold::SafetyLabel;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Engine status for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub created_at: i64,
    pub avg_latency_us: f64,
    pub inference_count: u64,
}

#[derive(Debug)]
pub struct DeployedModel {
    artifact: ModelArtifact,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

// ============================================================================
// ENGINE
// ============================================================================

impl DeployedModel {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let artifact = ModelArtifact::load(path)?;
        log::info!("Deployed model: {} ({})", artifact.model_name, path.display());
        Ok(Self::from_artifact(artifact))
    }

    /// Wrap an artifact that has already been verified
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.artifact.model_name
    }

    pub fn kind(&self) -> CandidateKind {
        self.artifact.kind
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Features must be in layout order
    pub fn predict(&self, features: &FeatureVector) -> SafetyLabel {
        let start = Instant::now();
        let label = self.artifact.pipeline.predict_one(ArrayView1::from(&features[..]));

        let elapsed = start.elapsed().as_micros() as u64;
        self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        log::trace!("Predicted {} in {}us", label, elapsed);
        label
    }

    /// Every layout feature must be present with a value
    pub fn predict_record(&self, record: &MeasurementRecord) -> Result<SafetyLabel, MissingFeature> {
        let features = record.to_feature_vector()?;
        Ok(self.predict(&features))
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { sum as f64 / count as f64 } else { 0.0 };

        EngineStatus {
            model_name: self.artifact.model_name.clone(),
            feature_version: self.artifact.feature_version,
            layout_hash: self.artifact.layout_hash,
            created_at: self.artifact.created_at,
            avg_latency_us: avg,
            inference_count: count,
        }
    }
}
