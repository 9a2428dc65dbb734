//! Model Module - training, selection and inference
//!
//! Two candidate pipelines (scaler + logistic regression, scaler + random
//! forest) are trained on a seeded split, evaluated, and one is promoted to
//! a checksummed artifact that the inference side loads.

pub mod split;
pub mod scaler;
pub mod logistic;
pub mod forest;
pub mod pipeline;
pub mod metrics;
pub mod artifact;
pub mod trainer;
pub mod inference;

#[cfg(test)]
mod tests;

// Re-export common types
pub use artifact::{ArtifactError, ModelArtifact};
pub use inference::{DeployedModel, EngineStatus};
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use pipeline::{CandidateKind, Classifier, FittedPipeline, TrainingConfig, TrainingFailure};
pub use split::{train_test_split, TrainTestSplit};
pub use trainer::{
    prepare_training_data, select, train_and_deploy, train_and_select, CandidateOutcome,
    CandidateResult, TrainerState, TrainingData, TrainingOutcome, TrainingRun,
};
