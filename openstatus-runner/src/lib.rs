//! Competition runner: configuration plus the load, fit, predict and submit
//! pipeline around the `openstatus-core` tables and `openstatus-ml` classifiers.

pub mod config;
pub mod runner;

pub use config::RunConfig;
pub use runner::{CompetitionRunner, PredictionReport, RunnerError};
