//! Groundwater Safety CLI - offline cleaning, labeling and training

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;

use cli::{Cli, Command, TrainingArgs};
use groundwater_core::constants::{APP_NAME, APP_VERSION};
use groundwater_core::logic::dataset::{self, Dataset};
use groundwater_core::logic::model::{self, CandidateOutcome, TrainingOutcome};
use groundwater_core::ThresholdTable;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    match cli.command {
        Command::Process { input, output, report } => process(&input, &output, &report),
        Command::Label { input, output } => {
            let labeled = label(&input)?;
            dataset::save_csv(&labeled, &output)?;
            println!("Labeled dataset saved to {}", output.display());
            Ok(())
        }
        Command::Train { input, training } => {
            let data = dataset::load_csv(&input)?;
            // An unlabeled input gets labeled on the fly
            let data = dataset::label_dataset(data, &ThresholdTable::groundwater());
            train(&data, &training)
        }
        Command::Pipeline { input, labeled_output, training } => {
            let labeled = label(&input)?;
            dataset::save_csv(&labeled, &labeled_output)?;
            log::info!("Labeled dataset saved to {}", labeled_output.display());
            train(&labeled, &training)
        }
    }
}

fn process(input: &Path, output: &Path, report: &Path) -> Result<()> {
    let raw = dataset::load_csv(input)?;
    let (processed, summary) = dataset::process_dataset(raw);

    dataset::save_csv(&processed, output)?;
    dataset::write_report(&processed, report)?;

    println!(
        "Processed {} columns ({} cells imputed) -> {}",
        summary.processed_columns.len(),
        summary.imputed_cells,
        output.display()
    );
    println!("Report written to {}", report.display());
    Ok(())
}

fn label(input: &Path) -> Result<Dataset> {
    let data = dataset::load_csv(input)?;
    Ok(dataset::label_dataset(data, &ThresholdTable::groundwater()))
}

fn train(data: &Dataset, args: &TrainingArgs) -> Result<()> {
    let path = args.model_path();
    let run = model::train_and_deploy(data, &args.config(), &path)
        .with_context(|| format!("training on {} rows", data.n_rows()))?;

    for candidate in &run.candidates {
        match &candidate.outcome {
            CandidateOutcome::Trained { report, .. } => {
                println!("Model: {}\n{}\n", candidate.kind, report);
            }
            CandidateOutcome::Failed(failure) => {
                println!("Model: {} (failed: {})\n", candidate.kind, failure);
            }
        }
    }

    match &run.outcome {
        TrainingOutcome::Deployed(artifact) => {
            println!("Best model saved: {} -> {}", artifact.model_name, path.display());
            Ok(())
        }
        TrainingOutcome::NoModelAvailable => {
            bail!("no candidate model trained successfully; nothing was deployed")
        }
    }
}
