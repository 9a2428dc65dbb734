//! Central Configuration Constants
//!
//! Single source of truth for all pipeline defaults.
//! Every value can be overridden from the environment (or the matching CLI flag).

/// Raw dataset read by the `process` command
pub const DEFAULT_RAW_INPUT: &str = "raw_groundwater.csv";

/// Output of the `process` command
pub const DEFAULT_PROCESSED_OUTPUT: &str = "processed_groundwater.csv";

/// Summary report written by the `process` command
pub const DEFAULT_REPORT_PATH: &str = "report.txt";

/// Dataset read by the `label` and `train` commands
pub const DEFAULT_TRAINING_INPUT: &str = "synthetic_groundwater.csv";

/// Labeled dataset written before training
pub const DEFAULT_LABELED_OUTPUT: &str = "processed_with_target.csv";

/// Well-known location of the deployed model artifact
pub const DEFAULT_MODEL_PATH: &str = "groundwater_best_model.json";

/// Name of the binary label column
pub const LABEL_COLUMN: &str = "safe_water";

/// Seed shared by the split and every stochastic candidate
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of rows held out for evaluation
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Trees grown by the ensemble candidate
pub const DEFAULT_N_ESTIMATORS: usize = 300;

/// Iteration cap for the linear candidate
pub const DEFAULT_MAX_ITER: usize = 1000;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Groundwater Safety";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("GROUNDWATER_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get the training seed from environment or use default
pub fn get_seed() -> u64 {
    std::env::var("GROUNDWATER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// Get the ensemble size from environment or use default
pub fn get_n_estimators() -> usize {
    std::env::var("GROUNDWATER_N_ESTIMATORS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_N_ESTIMATORS)
}

/// Check if candidates should train on parallel threads
pub fn is_parallel_training_enabled() -> bool {
    std::env::var("GROUNDWATER_PARALLEL_TRAINING")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
