//! Candidate pipelines - StandardScaler followed by a classifier
//!
//! The candidate set is closed: one linear model and one tree ensemble.
//! Both expose the same fit/predict surface so the trainer can fan them out
//! without caring which is which.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::forest::RandomForest;
use super::logistic::LogisticRegression;
use super::scaler::StandardScaler;
use crate::constants::{DEFAULT_MAX_ITER, DEFAULT_N_ESTIMATORS, DEFAULT_SEED, DEFAULT_TEST_RATIO};
use crate::logic::threshold::SafetyLabel;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub seed: u64,
    pub test_ratio: f64,
    pub n_estimators: usize,
    pub max_iter: usize,
    /// Inverse L2 strength for the linear candidate
    pub c: f64,
    /// Train candidates on separate threads
    pub parallel: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_ratio: DEFAULT_TEST_RATIO,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_iter: DEFAULT_MAX_ITER,
            c: 1.0,
            parallel: true,
        }
    }
}

// ============================================================================
// FAILURES
// ============================================================================

/// Why a single candidate could not be trained. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingFailure {
    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("target has a single class ({0}); at least two are required")]
    SingleClass(u8),

    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("training thread panicked")]
    Panicked,
}

// ============================================================================
// CANDIDATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Linear,
    Ensemble,
}

impl CandidateKind {
    /// Fallback order when the ensemble is unavailable
    pub const PRIORITY: [CandidateKind; 2] = [CandidateKind::Linear, CandidateKind::Ensemble];

    pub fn name(&self) -> &'static str {
        match self {
            CandidateKind::Linear => "Logistic Regression",
            CandidateKind::Ensemble => "Random Forest",
        }
    }

    pub fn fit(
        self,
        x: ArrayView2<f64>,
        y: &[u8],
        config: &TrainingConfig,
    ) -> Result<FittedPipeline, TrainingFailure> {
        if x.nrows() != y.len() {
            return Err(TrainingFailure::ShapeMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }

        let scaler = StandardScaler::fit(x)?;
        let scaled = scaler.transform(x);

        let classifier = match self {
            CandidateKind::Linear => Classifier::Logistic(LogisticRegression::fit(
                scaled.view(),
                y,
                config.c,
                config.max_iter,
            )?),
            CandidateKind::Ensemble => Classifier::Forest(RandomForest::fit(
                scaled.view(),
                y,
                config.n_estimators,
                config.seed,
            )?),
        };

        Ok(FittedPipeline {
            kind: self,
            scaler,
            classifier,
        })
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    Logistic(LogisticRegression),
    Forest(RandomForest),
}

impl Classifier {
    fn predict(&self, row: ArrayView1<f64>) -> u8 {
        match self {
            Classifier::Logistic(model) => model.predict(row),
            Classifier::Forest(model) => model.predict(row),
        }
    }
}

// ============================================================================
// FITTED PIPELINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub kind: CandidateKind,
    pub scaler: StandardScaler,
    pub classifier: Classifier,
}

impl FittedPipeline {
    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn predict_one(&self, row: ArrayView1<f64>) -> SafetyLabel {
        let scaled = Array1::from(self.scaler.transform_row(row));
        SafetyLabel::from_safe(self.classifier.predict(scaled.view()) == 1)
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Vec<SafetyLabel> {
        let scaled: Array2<f64> = self.scaler.transform(x);
        scaled
            .rows()
            .into_iter()
            .map(|row| SafetyLabel::from_safe(self.classifier.predict(row) == 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            n_estimators: 15,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.n_estimators, 300);
        assert_eq!(config.max_iter, 1000);
        assert_eq!(config.c, 1.0);
        assert_eq!(config.test_ratio, 0.2);
    }

    #[test]
    fn test_both_candidates_fit_and_predict() {
        let x = array![[10.0, 1.0], [11.0, 1.5], [12.0, 0.5], [30.0, 9.0], [31.0, 8.5], [32.0, 9.5]];
        let y = [0, 0, 0, 1, 1, 1];

        for kind in CandidateKind::PRIORITY {
            let pipeline = kind.fit(x.view(), &y, &small_config()).unwrap();
            assert_eq!(pipeline.kind, kind);
            assert_eq!(pipeline.n_features(), 2);
            assert_eq!(pipeline.predict_one(array![10.5, 1.0].view()), SafetyLabel::Unsafe);
            assert_eq!(pipeline.predict_one(array![31.5, 9.0].view()), SafetyLabel::Safe);
            assert_eq!(pipeline.predict(x.view()).len(), 6);
        }
    }

    #[test]
    fn test_single_class_only_fails_linear() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = [0, 0, 0];

        let linear = CandidateKind::Linear.fit(x.view(), &y, &small_config());
        assert_eq!(linear.unwrap_err(), TrainingFailure::SingleClass(0));

        let ensemble = CandidateKind::Ensemble.fit(x.view(), &y, &small_config()).unwrap();
        assert_eq!(ensemble.predict_one(array![2.0].view()), SafetyLabel::Unsafe);
    }

    #[test]
    fn test_shape_mismatch() {
        let x = array![[1.0], [2.0]];
        let result = CandidateKind::Ensemble.fit(x.view(), &[1], &small_config());
        assert_eq!(result.unwrap_err(), TrainingFailure::ShapeMismatch { rows: 2, labels: 1 });
    }

    #[test]
    fn test_names() {
        assert_eq!(CandidateKind::Linear.to_string(), "Logistic Regression");
        assert_eq!(CandidateKind::Ensemble.name(), "Random Forest");
    }
}
