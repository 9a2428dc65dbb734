//! Groundwater Safety Core
//!
//! Threshold labeling, model training/selection and inference for the
//! Safe/Unsafe groundwater classifier. The `groundwater` binary drives the
//! offline stages; the prediction server links this crate for inference.

pub mod constants;
pub mod logic;

pub use logic::dataset::Dataset;
pub use logic::error::{PipelineError, Result};
pub use logic::features::{FeatureVector, MeasurementRecord, FEATURE_COUNT, FEATURE_LAYOUT};
pub use logic::model::{DeployedModel, ModelArtifact, TrainingConfig, TrainingOutcome};
pub use logic::threshold::{evaluate, SafetyLabel, ThresholdTable};
