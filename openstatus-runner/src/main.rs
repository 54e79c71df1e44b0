use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use log::{info, LevelFilter};

use openstatus_core::submission;
use openstatus_ml::ModelKind;
use openstatus_runner::{CompetitionRunner, RunConfig};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "openstatus: fit a classifier on the closed-questions data and write a submission"
)]
struct Cli {
    /// Optional TOML configuration; built-in defaults apply without it
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory containing train.csv and test.csv (overrides the config)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Classifier to train (overrides the config)
    #[arg(long, value_enum)]
    model: Option<ModelArg>,

    /// Increase output verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModelArg {
    LogisticRegression,
    GaussianNaiveBayes,
    MultinomialNaiveBayes,
    KNeighbors,
    DecisionTree,
    RandomForest,
}

impl From<ModelArg> for ModelKind {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::LogisticRegression => ModelKind::LogisticRegression,
            ModelArg::GaussianNaiveBayes => ModelKind::GaussianNaiveBayes,
            ModelArg::MultinomialNaiveBayes => ModelKind::MultinomialNaiveBayes,
            ModelArg::KNeighbors => ModelKind::KNeighbors,
            ModelArg::DecisionTree => ModelKind::DecisionTree,
            ModelArg::RandomForest => ModelKind::RandomForest,
        }
    }
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    let started_at = submission::now();
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config.data.dir = dir;
    }
    if let Some(model) = cli.model {
        config.model.kind = model.into();
    }
    config.validate()?;
    info!(
        "running {} on {} with features {:?}",
        config.model.kind,
        config.data.dir.display(),
        config.model.features
    );

    let submission_file = submission::submission_path(&config.data.dir, started_at)?;
    let runner = CompetitionRunner::load(
        &config.data.train_path(),
        &config.data.test_path(),
        config.data.expected_shape(),
    )?
    .with_model(config.model.kind)
    .with_features(config.model.features)
    .with_cv_folds(config.model.cv_folds)
    .with_scoring(config.model.scoring);

    runner.run(&submission_file)?;

    let duration = start_time.elapsed().as_secs();
    println!("Done! That took {}m{:02}s", duration / 60, duration % 60);
    Ok(())
}

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.filter_level(level);
    builder.try_init().map_err(|err| err.into())
}
