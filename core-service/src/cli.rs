use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use groundwater_core::constants::{
    get_model_path, get_n_estimators, get_seed, is_parallel_training_enabled,
    DEFAULT_LABELED_OUTPUT, DEFAULT_PROCESSED_OUTPUT, DEFAULT_RAW_INPUT, DEFAULT_REPORT_PATH,
    DEFAULT_TEST_RATIO, DEFAULT_TRAINING_INPUT,
};
use groundwater_core::TrainingConfig;

#[derive(Debug, Parser)]
#[command(name = "groundwater", version, about = "Groundwater safety labeling and model training")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Impute and normalize a raw dataset, and write a summary report
    Process {
        #[arg(long, env = "GROUNDWATER_RAW_INPUT", default_value = DEFAULT_RAW_INPUT)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_PROCESSED_OUTPUT)]
        output: PathBuf,
        #[arg(long, default_value = DEFAULT_REPORT_PATH)]
        report: PathBuf,
    },
    /// Append the threshold-derived `safe_water` label
    Label {
        #[arg(long, env = "GROUNDWATER_INPUT", default_value = DEFAULT_TRAINING_INPUT)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_LABELED_OUTPUT)]
        output: PathBuf,
    },
    /// Train the candidates on a labeled dataset and deploy the best one
    Train {
        #[arg(long, env = "GROUNDWATER_LABELED_INPUT", default_value = DEFAULT_LABELED_OUTPUT)]
        input: PathBuf,
        #[command(flatten)]
        training: TrainingArgs,
    },
    /// Label, save the labeled dataset, then train and deploy
    Pipeline {
        #[arg(long, env = "GROUNDWATER_INPUT", default_value = DEFAULT_TRAINING_INPUT)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_LABELED_OUTPUT)]
        labeled_output: PathBuf,
        #[command(flatten)]
        training: TrainingArgs,
    },
}

#[derive(Debug, Args)]
pub struct TrainingArgs {
    /// Where the selected model artifact is written
    #[arg(long, default_value_t = get_model_path())]
    pub model: String,
    #[arg(long, default_value_t = get_seed())]
    pub seed: u64,
    #[arg(long, default_value_t = get_n_estimators())]
    pub n_estimators: usize,
    #[arg(long, default_value_t = DEFAULT_TEST_RATIO)]
    pub test_ratio: f64,
    /// Train candidates one after another instead of on separate threads
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

impl TrainingArgs {
    pub fn model_path(&self) -> PathBuf {
        PathBuf::from(&self.model)
    }

    pub fn config(&self) -> TrainingConfig {
        TrainingConfig {
            seed: self.seed,
            test_ratio: self.test_ratio,
            n_estimators: self.n_estimators.max(1),
            parallel: !self.sequential && is_parallel_training_enabled(),
            ..TrainingConfig::default()
        }
    }
}
