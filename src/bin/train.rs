//! Attrition model trainer
//!
//! Reads the HR attrition CSV, fits the pipeline, prints the held-out report
//! and writes the artifact consumed by the prediction service.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attrition_risk::pipeline::{ClassWeight, LogisticParams};
use attrition_risk::training::{self, TrainConfig};

#[derive(Parser)]
#[command(
    name = "attrition-train",
    about = "Train the employee attrition risk model",
    version
)]
struct Cli {
    /// Labelled training CSV (IBM HR attrition layout)
    #[arg(short, long, default_value = training::DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Where to write the model artifact
    #[arg(short, long, default_value = training::DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = training::DEFAULT_TEST_SIZE)]
    test_size: f64,

    /// Seed for the stratified split
    #[arg(long, default_value_t = training::DEFAULT_SEED)]
    seed: u64,

    /// Solver iteration cap
    #[arg(long, default_value_t = 5000)]
    max_iter: usize,

    /// Inverse L2 regularisation strength
    #[arg(short = 'c', long = "c", default_value_t = 1.0)]
    inverse_reg: f64,

    /// Weight every sample equally instead of balancing classes
    #[arg(long)]
    unweighted: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "attrition_risk=debug" } else { "attrition_risk=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = TrainConfig {
        data_path: cli.data,
        output_path: cli.output,
        test_size: cli.test_size,
        seed: cli.seed,
        params: LogisticParams {
            c: cli.inverse_reg,
            max_iter: cli.max_iter,
            class_weight: if cli.unweighted {
                ClassWeight::Uniform
            } else {
                ClassWeight::Balanced
            },
            ..LogisticParams::default()
        },
    };

    let outcome = training::run(&config)
        .with_context(|| format!("training on {} failed", config.data_path.display()))?;

    println!("{}", outcome.report);
    println!();
    println!("Saved {}", config.output_path.display());
    Ok(())
}
