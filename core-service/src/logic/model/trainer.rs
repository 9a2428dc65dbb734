//! Trainer / Selector - one batch pass from labeled dataset to artifact
//!
//! Idle → Splitting → Training → Evaluating → Selecting → Deployed | NoModelAvailable
//!
//! Candidate failures are contained: a candidate that cannot be trained is
//! logged and dropped, the run only ends without a model when every
//! candidate failed.

use std::path::Path;
use std::thread;

use ndarray::{Array2, ArrayView2, Axis};

use super::artifact::ModelArtifact;
use super::metrics::ClassificationReport;
use super::pipeline::{CandidateKind, FittedPipeline, TrainingConfig, TrainingFailure};
use super::split::{train_test_split, TrainTestSplit};
use crate::logic::dataset::{median, read_labels, Dataset};
use crate::logic::error::{PipelineError, Result};
use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::threshold::SafetyLabel;

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Idle,
    Splitting,
    Training,
    Evaluating,
    Selecting,
    Deployed,
    NoModelAvailable,
}

fn advance(state: &mut TrainerState, next: TrainerState) {
    log::debug!("Trainer: {:?} -> {:?}", state, next);
    *state = next;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Imputed feature matrix (layout column order) plus labels
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub features: Array2<f64>,
    pub labels: Vec<SafetyLabel>,
    /// Columns with no usable value at all, filled with 0.0
    pub empty_columns: Vec<&'static str>,
}

impl TrainingData {
    pub fn n_rows(&self) -> usize {
        self.labels.len()
    }

    fn subset(&self, rows: &[usize]) -> (Array2<f64>, Vec<u8>) {
        let x = self.features.select(Axis(0), rows);
        let y = rows.iter().map(|&i| self.labels[i].encoded()).collect();
        (x, y)
    }
}

#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    Trained {
        pipeline: FittedPipeline,
        report: ClassificationReport,
    },
    Failed(TrainingFailure),
}

#[derive(Debug, Clone)]
pub struct CandidateResult {
    pub kind: CandidateKind,
    pub outcome: CandidateOutcome,
}

impl CandidateResult {
    pub fn is_trained(&self) -> bool {
        matches!(self.outcome, CandidateOutcome::Trained { .. })
    }

    pub fn report(&self) -> Option<&ClassificationReport> {
        match &self.outcome {
            CandidateOutcome::Trained { report, .. } => Some(report),
            CandidateOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TrainingOutcome {
    Deployed(ModelArtifact),
    NoModelAvailable,
}

#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub state: TrainerState,
    pub n_train: usize,
    pub n_test: usize,
    pub stratified: bool,
    /// In candidate priority order
    pub candidates: Vec<CandidateResult>,
    pub outcome: TrainingOutcome,
}

impl TrainingRun {
    pub fn artifact(&self) -> Option<&ModelArtifact> {
        match &self.outcome {
            TrainingOutcome::Deployed(artifact) => Some(artifact),
            TrainingOutcome::NoModelAvailable => None,
        }
    }
}

// ============================================================================
// PREPARATION
// ============================================================================

/// Extract labels and the eleven feature columns, median-imputing each
/// column over the full input.
pub fn prepare_training_data(dataset: &Dataset) -> Result<TrainingData> {
    let n_rows = dataset.n_rows();
    if n_rows == 0 {
        return Err(PipelineError::EmptyDataset);
    }
    let labels = read_labels(dataset)?;

    let mut features = Array2::<f64>::zeros((n_rows, FEATURE_COUNT));
    let mut empty_columns = Vec::new();

    for (j, &name) in FEATURE_LAYOUT.iter().enumerate() {
        let column = dataset
            .numeric_column(name)
            .unwrap_or_else(|| vec![None; n_rows]);

        let fill = match median(&column) {
            Some(m) => m,
            None => {
                log::warn!("Feature '{}' has no values; imputing 0.0", name);
                empty_columns.push(name);
                0.0
            }
        };

        for (i, value) in column.iter().enumerate() {
            features[[i, j]] = value.filter(|v| v.is_finite()).unwrap_or(fill);
        }
    }

    Ok(TrainingData {
        features,
        labels,
        empty_columns,
    })
}

// ============================================================================
// TRAINING
// ============================================================================

fn evaluate(pipeline: &FittedPipeline, x: ArrayView2<f64>, y: &[u8]) -> ClassificationReport {
    let actual: Vec<SafetyLabel> = y.iter().map(|&v| SafetyLabel::from_safe(v == 1)).collect();
    let predicted = pipeline.predict(x);
    ClassificationReport::evaluate(&actual, &predicted)
}

fn train_candidate(
    kind: CandidateKind,
    train: (ArrayView2<f64>, &[u8]),
    test: (ArrayView2<f64>, &[u8]),
    config: &TrainingConfig,
) -> CandidateOutcome {
    match kind.fit(train.0, train.1, config) {
        Ok(pipeline) => {
            let report = evaluate(&pipeline, test.0, test.1);
            CandidateOutcome::Trained { pipeline, report }
        }
        Err(failure) => CandidateOutcome::Failed(failure),
    }
}

/// Fit every candidate. Results come back in `CandidateKind::PRIORITY`
/// order regardless of which thread finishes first.
pub fn train_candidates(data: &TrainingData, split: &TrainTestSplit, config: &TrainingConfig) -> Vec<CandidateResult> {
    let (x_train, y_train) = data.subset(&split.train);
    let (x_test, y_test) = data.subset(&split.test);
    let train = (x_train.view(), &y_train[..]);
    let test = (x_test.view(), &y_test[..]);

    let outcomes: Vec<CandidateOutcome> = if config.parallel {
        thread::scope(|scope| {
            let handles: Vec<_> = CandidateKind::PRIORITY
                .iter()
                .map(|&kind| scope.spawn(move || train_candidate(kind, train, test, config)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or(CandidateOutcome::Failed(TrainingFailure::Panicked)))
                .collect()
        })
    } else {
        CandidateKind::PRIORITY
            .iter()
            .map(|&kind| train_candidate(kind, train, test, config))
            .collect()
    };

    CandidateKind::PRIORITY
        .iter()
        .zip(outcomes)
        .map(|(&kind, outcome)| CandidateResult { kind, outcome })
        .collect()
}

// ============================================================================
// SELECTION
// ============================================================================

/// Ensemble whenever it trained, metrics notwithstanding; otherwise the
/// first trained candidate in priority order.
pub fn select(results: &[CandidateResult]) -> Option<CandidateKind> {
    let trained = |kind: CandidateKind| results.iter().any(|r| r.kind == kind && r.is_trained());

    if trained(CandidateKind::Ensemble) {
        return Some(CandidateKind::Ensemble);
    }
    CandidateKind::PRIORITY.iter().copied().find(|&kind| trained(kind))
}

pub fn train_and_select(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainingRun> {
    let mut state = TrainerState::Idle;
    let data = prepare_training_data(dataset)?;

    advance(&mut state, TrainerState::Splitting);
    let split = train_test_split(&data.labels, config.test_ratio, config.seed);
    log::info!(
        "Split {} rows: {} train / {} test ({})",
        data.n_rows(),
        split.train.len(),
        split.test.len(),
        if split.stratified { "stratified" } else { "unstratified" }
    );

    advance(&mut state, TrainerState::Training);
    let candidates = train_candidates(&data, &split, config);

    advance(&mut state, TrainerState::Evaluating);
    for result in &candidates {
        match &result.outcome {
            CandidateOutcome::Trained { report, .. } => {
                log::info!("Model: {}\n{}", result.kind, report);
            }
            CandidateOutcome::Failed(failure) => {
                log::error!("Model {} failed to train: {}", result.kind, failure);
            }
        }
    }

    advance(&mut state, TrainerState::Selecting);
    let selected = select(&candidates).and_then(|kind| {
        candidates.iter().find(|r| r.kind == kind).and_then(|r| match &r.outcome {
            CandidateOutcome::Trained { pipeline, report } => Some((pipeline.clone(), report.clone())),
            CandidateOutcome::Failed(_) => None,
        })
    });

    let outcome = match selected {
        Some((pipeline, report)) => {
            log::info!("Best model selected: {}", pipeline.kind);
            let artifact = ModelArtifact::new(pipeline, Some(report))?;
            advance(&mut state, TrainerState::Deployed);
            TrainingOutcome::Deployed(artifact)
        }
        None => {
            log::warn!("No candidate trained successfully; no model available");
            advance(&mut state, TrainerState::NoModelAvailable);
            TrainingOutcome::NoModelAvailable
        }
    };

    Ok(TrainingRun {
        state,
        n_train: split.train.len(),
        n_test: split.test.len(),
        stratified: split.stratified,
        candidates,
        outcome,
    })
}

/// Train, select, and write the artifact when one was produced
pub fn train_and_deploy(dataset: &Dataset, config: &TrainingConfig, model_path: &Path) -> Result<TrainingRun> {
    let run = train_and_select(dataset, config)?;
    if let Some(artifact) = run.artifact() {
        artifact.save(model_path)?;
    }
    Ok(run)
}
