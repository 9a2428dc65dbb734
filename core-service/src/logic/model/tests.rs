use super::*;
use crate::constants::LABEL_COLUMN;
use crate::logic::dataset::{label_dataset, Dataset};
use crate::logic::error::PipelineError;
use crate::logic::features::{FeatureVector, FEATURE_LAYOUT};
use crate::logic::threshold::{SafetyLabel, ThresholdTable};
use ndarray::array;
use std::fs;
use tempfile::tempdir;

fn config() -> TrainingConfig {
    TrainingConfig {
        n_estimators: 20,
        ..TrainingConfig::default()
    }
}

/// Deterministic synthetic samples, labeled by the threshold engine
fn synthetic_dataset(n: usize) -> Dataset {
    let headers: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
    let rows = (0..n)
        .map(|i| {
            let ph = 6.0 + (i % 7) as f64 * 0.5;
            let tds = 100.0 + ((i * 37) % 600) as f64;
            let values = [ph, tds, 1.0, 10.0, 0.005, 0.005, 1.0, 150.0, 20.0, 800.0, 0.0];
            values.iter().map(|v| v.to_string()).collect()
        })
        .collect();
    label_dataset(Dataset::from_rows(headers, rows), &ThresholdTable::groundwater())
}

fn single_class_dataset(n: usize) -> Dataset {
    let mut headers: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
    headers.push(LABEL_COLUMN.to_string());
    let rows = (0..n)
        .map(|i| {
            let mut row: Vec<String> = (0..FEATURE_LAYOUT.len())
                .map(|j| ((i * 3 + j) % 5).to_string())
                .collect();
            row.push("1".to_string());
            row
        })
        .collect();
    Dataset::from_rows(headers, rows)
}

fn feature_rows(dataset: &Dataset) -> Vec<FeatureVector> {
    let data = prepare_training_data(dataset).unwrap();
    data.features
        .rows()
        .into_iter()
        .map(|row| {
            let mut v = [0.0; 11];
            v.iter_mut().zip(row.iter()).for_each(|(d, s)| *d = *s);
            v
        })
        .collect()
}

// ============================================================================
// PREPARATION
// ============================================================================

#[test]
fn test_prepare_imputes_with_column_median() {
    let headers = vec!["pH".to_string(), "TDS".to_string(), LABEL_COLUMN.to_string()];
    let rows = vec![
        vec!["7.0".into(), "100".into(), "1".into()],
        vec!["".into(), "NaN".into(), "0".into()],
        vec!["8.0".into(), "300".into(), "1".into()],
    ];
    let data = prepare_training_data(&Dataset::from_rows(headers, rows)).unwrap();

    assert_eq!(data.features.dim(), (3, 11));
    assert_eq!(data.features[[1, 0]], 7.5);
    assert_eq!(data.features[[1, 1]], 200.0);
    // Nine layout columns absent entirely
    assert_eq!(data.empty_columns.len(), 9);
    assert_eq!(data.features[[0, 10]], 0.0);
    assert_eq!(data.labels, vec![SafetyLabel::Safe, SafetyLabel::Unsafe, SafetyLabel::Safe]);
}

#[test]
fn test_prepare_rejects_empty_and_unlabeled() {
    let empty = Dataset::new(vec![LABEL_COLUMN.to_string()]);
    assert!(matches!(prepare_training_data(&empty), Err(PipelineError::EmptyDataset)));

    let unlabeled = Dataset::from_rows(vec!["pH".into()], vec![vec!["7".into()]]);
    assert!(matches!(
        prepare_training_data(&unlabeled),
        Err(PipelineError::MissingLabelColumn(_))
    ));
}

// ============================================================================
// SELECTION
// ============================================================================

fn trained(kind: CandidateKind, report: ClassificationReport) -> CandidateResult {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let pipeline = kind.fit(x.view(), &[0, 0, 1, 1], &config()).unwrap();
    CandidateResult {
        kind,
        outcome: CandidateOutcome::Trained { pipeline, report },
    }
}

fn failed(kind: CandidateKind) -> CandidateResult {
    CandidateResult {
        kind,
        outcome: CandidateOutcome::Failed(TrainingFailure::SingleClass(1)),
    }
}

#[test]
fn test_ensemble_selected_even_when_linear_scores_higher() {
    use SafetyLabel::{Safe, Unsafe};
    let actual = [Safe, Unsafe, Safe, Unsafe];
    let perfect = ClassificationReport::evaluate(&actual, &actual);
    let poor = ClassificationReport::evaluate(&actual, &[Unsafe, Safe, Unsafe, Safe]);
    assert!(perfect.weighted_avg.f1 > poor.weighted_avg.f1);

    let results = vec![
        trained(CandidateKind::Linear, perfect),
        trained(CandidateKind::Ensemble, poor),
    ];
    assert_eq!(select(&results), Some(CandidateKind::Ensemble));
}

#[test]
fn test_selection_falls_back_in_priority_order() {
    let report = ClassificationReport::evaluate(&[], &[]);

    let results = vec![
        trained(CandidateKind::Linear, report),
        failed(CandidateKind::Ensemble),
    ];
    assert_eq!(select(&results), Some(CandidateKind::Linear));

    let results = vec![failed(CandidateKind::Linear), failed(CandidateKind::Ensemble)];
    assert_eq!(select(&results), None);
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_train_and_select_deploys_ensemble() {
    let dataset = synthetic_dataset(60);
    let run = train_and_select(&dataset, &config()).unwrap();

    assert_eq!(run.state, TrainerState::Deployed);
    assert_eq!(run.n_train + run.n_test, 60);
    assert_eq!(run.n_test, 12);
    assert!(run.stratified);
    assert_eq!(run.candidates.len(), 2);
    assert_eq!(run.candidates[0].kind, CandidateKind::Linear);
    assert!(run.candidates.iter().all(CandidateResult::is_trained));

    let artifact = run.artifact().unwrap();
    assert_eq!(artifact.kind, CandidateKind::Ensemble);
    assert_eq!(artifact.model_name, "Random Forest");
    assert_eq!(artifact.evaluation.as_ref().map(|r| r.confusion.total()), Some(12));
}

#[test]
fn test_single_class_linear_fails_ensemble_deploys() {
    let run = train_and_select(&single_class_dataset(10), &config()).unwrap();

    assert!(!run.stratified);
    match &run.candidates[0].outcome {
        CandidateOutcome::Failed(failure) => assert_eq!(*failure, TrainingFailure::SingleClass(1)),
        other => panic!("Expected linear failure, got {:?}", other),
    }
    let artifact = run.artifact().unwrap();
    assert_eq!(artifact.kind, CandidateKind::Ensemble);

    let model = DeployedModel::from_artifact(artifact.clone());
    assert_eq!(model.predict(&[3.0; 11]), SafetyLabel::Safe);
}

#[test]
fn test_no_model_available_writes_nothing() {
    // Magnitudes large enough that feature means overflow in both scalers
    let mut headers: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
    headers.push(LABEL_COLUMN.to_string());
    let rows = (0..5)
        .map(|i| {
            let mut row = vec!["1.7e308".to_string(); FEATURE_LAYOUT.len()];
            row.push((i % 2).to_string());
            row
        })
        .collect();
    let dataset = Dataset::from_rows(headers, rows);

    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    let run = train_and_deploy(&dataset, &config(), &path).unwrap();

    assert_eq!(run.state, TrainerState::NoModelAvailable);
    assert!(matches!(run.outcome, TrainingOutcome::NoModelAvailable));
    assert!(run.candidates.iter().all(|c| !c.is_trained()));
    assert!(!path.exists());
}

#[test]
fn test_training_is_reproducible_and_order_independent() {
    let dataset = synthetic_dataset(40);
    let parallel = train_and_select(&dataset, &config()).unwrap();
    let sequential = train_and_select(
        &dataset,
        &TrainingConfig {
            parallel: false,
            ..config()
        },
    )
    .unwrap();

    let (a, b) = (parallel.artifact().unwrap(), sequential.artifact().unwrap());
    assert_eq!(a.pipeline, b.pipeline);
    assert_eq!(a.checksum, b.checksum);
}

// ============================================================================
// ARTIFACT
// ============================================================================

#[test]
fn test_artifact_round_trip_predicts_identically() {
    let dataset = synthetic_dataset(50);
    let dir = tempdir().unwrap();
    let path = dir.path().join("models").join("best.json");

    let run = train_and_deploy(&dataset, &config(), &path).unwrap();
    let in_memory = DeployedModel::from_artifact(run.artifact().unwrap().clone());
    let loaded = DeployedModel::load(&path).unwrap();

    assert_eq!(loaded.kind(), CandidateKind::Ensemble);
    for row in feature_rows(&dataset) {
        assert_eq!(loaded.predict(&row), in_memory.predict(&row));
    }
    assert_eq!(loaded.status().inference_count, 50);
    assert!(!dir.path().join("models").join("best.json.tmp").exists());
}

#[test]
fn test_artifact_replaces_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, "stale").unwrap();

    train_and_deploy(&synthetic_dataset(30), &config(), &path).unwrap();
    assert!(ModelArtifact::load(&path).is_ok());
}

#[test]
fn test_tampered_artifact_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    train_and_deploy(&synthetic_dataset(30), &config(), &path).unwrap();

    let mut json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    json["pipeline"]["scaler"]["mean"][0] = serde_json::json!(123.456);
    fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    assert!(matches!(
        ModelArtifact::load(&path),
        Err(ArtifactError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_layout_mismatch_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    train_and_deploy(&synthetic_dataset(30), &config(), &path).unwrap();

    let mut json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    json["feature_version"] = serde_json::json!(99);
    fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    match ModelArtifact::load(&path) {
        Err(ArtifactError::LayoutMismatch(e)) => assert_eq!(e.actual_version, 99),
        other => panic!("Expected layout mismatch, got {:?}", other.map(|a| a.model_name)),
    }
}

#[test]
fn test_missing_artifact_is_not_found() {
    let dir = tempdir().unwrap();
    let result = DeployedModel::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ArtifactError::NotFound(_))));
}

#[test]
fn test_predict_record_requires_every_feature() {
    let run = train_and_select(&synthetic_dataset(30), &config()).unwrap();
    let model = DeployedModel::from_artifact(run.artifact().unwrap().clone());

    let complete = crate::logic::features::MeasurementRecord::from_vector(&[7.0, 200.0, 1.0, 10.0, 0.005, 0.005, 1.0, 150.0, 20.0, 800.0, 0.0]);
    assert!(model.predict_record(&complete).is_ok());

    let partial = complete.clone().with_missing("lead");
    let err = model.predict_record(&partial).unwrap_err();
    assert_eq!(err.0, "lead");
}
