use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use log::{debug, info};
use thiserror::Error;

use openstatus_core::{
    extract_columns, Dataset, DatasetShape, FeatureMatrix, LabelVector, Submission, Table,
    DEFAULT_FEATURES, LABEL_COLUMN,
};
use openstatus_ml::{cross_val_score, mean, standard_deviation, Classifier, ModelKind, Scoring};

use crate::config::DEFAULT_CV_FOLDS;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RunnerError {
    #[error(
        "Somewhere along the way you lost test samples! Please fix. Expected {expected}, found {found}"
    )]
    LostTestSamples { expected: usize, found: usize },
}

/// What a call to [`CompetitionRunner::make_predictions`] produced.
#[derive(Clone, Debug)]
pub struct PredictionReport {
    pub model: &'static str,
    pub train_samples: usize,
    pub test_samples: usize,
    /// `P(OpenStatus = 1)` per test row, in test-file order.
    pub predictions: Vec<f64>,
    pub cv_scores: Vec<f64>,
    pub submission_path: PathBuf,
}

impl PredictionReport {
    pub fn cv_mean(&self) -> f64 {
        mean(&self.cv_scores)
    }
}

/// Loads the competition data once and turns a classifier into a submission.
#[derive(Debug)]
pub struct CompetitionRunner {
    dataset: Dataset,
    model_kind: ModelKind,
    features: Vec<String>,
    cv_folds: usize,
    scoring: Scoring,
}

impl CompetitionRunner {
    /// Loads both CSV files and checks them against `expected`.
    pub fn load(train_file: &Path, test_file: &Path, expected: DatasetShape) -> Result<Self> {
        let dataset = Dataset::load(train_file, test_file, expected)?;
        Ok(Self::from_dataset(dataset))
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            dataset,
            model_kind: ModelKind::default(),
            features: DEFAULT_FEATURES.iter().map(|name| name.to_string()).collect(),
            cv_folds: DEFAULT_CV_FOLDS,
            scoring: Scoring::default(),
        }
    }

    pub fn with_model(mut self, kind: ModelKind) -> Self {
        self.model_kind = kind;
        self
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Training rows followed by test rows.
    pub fn data(&self) -> &Table {
        self.dataset.data()
    }

    pub fn n_train(&self) -> usize {
        self.dataset.n_train()
    }

    pub fn n_test(&self) -> usize {
        self.dataset.n_test()
    }

    /// The configured classifier, unfitted.
    pub fn setup_model(&self) -> Box<dyn Classifier> {
        self.model_kind.build()
    }

    /// Feature matrix from the configured columns and the `OpenStatus` labels,
    /// which are NaN for every test row.
    pub fn extract_features(&self, data: &Table) -> Result<(FeatureMatrix, LabelVector)> {
        extract_columns(data, self.features.as_slice(), LABEL_COLUMN).context("extract features")
    }

    /// Fits on the labelled rows, predicts the unlabelled ones, cross-validates
    /// and writes the submission.
    pub fn make_predictions(
        &self,
        model: &mut dyn Classifier,
        x: &FeatureMatrix,
        y: &[f64],
        submission_file: &Path,
    ) -> Result<PredictionReport> {
        ensure!(
            x.len() == y.len(),
            "{} feature rows but {} labels",
            x.len(),
            y.len()
        );
        let (mut x_train, mut y_train, mut x_test) = (Vec::new(), Vec::new(), Vec::new());
        for (row, &label) in x.rows().iter().zip(y) {
            if label.is_nan() {
                x_test.push(row.clone());
            } else {
                x_train.push(row.clone());
                y_train.push(label);
            }
        }

        if x_test.len() != self.n_test() {
            return Err(RunnerError::LostTestSamples {
                expected: self.n_test(),
                found: x_test.len(),
            }
            .into());
        }

        let share = if self.n_train() == 0 {
            0.0
        } else {
            100.0 * x_train.len() as f64 / self.n_train() as f64
        };
        info!(
            "Training {} using {} samples ({}% of original training set)",
            model.name(),
            x_train.len(),
            share as u32
        );
        model
            .fit(&x_train, &y_train)
            .with_context(|| format!("fit {}", model.name()))?;

        info!("Making predictions on the test set..");
        let predictions = model
            .predict_proba(&x_test)
            .with_context(|| format!("predict with {}", model.name()))?;

        info!("Cross-validating model...");
        let cv_scores = cross_val_score(&*model, &x_train, &y_train, self.cv_folds, self.scoring)
            .context("cross-validate model")?;
        let cv_mean = mean(&cv_scores);
        info!(
            "Cross-validated {} score: {:.4}  ([{}])",
            self.scoring.label(),
            cv_mean,
            cv_scores
                .iter()
                .map(|score| format!("{score:.4}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        debug!(
            "cross-validation standard deviation {:.4}",
            standard_deviation(&cv_scores, cv_mean)
        );

        let submission = Submission::new(self.dataset.test_ids().to_vec(), predictions)?;
        submission.write(submission_file)?;

        Ok(PredictionReport {
            model: model.name(),
            train_samples: x_train.len(),
            test_samples: x_test.len(),
            predictions: submission.probabilities().to_vec(),
            cv_scores,
            submission_path: submission_file.to_path_buf(),
        })
    }

    /// The whole pipeline: extract features, set up the model, predict.
    pub fn run(&self, submission_file: &Path) -> Result<PredictionReport> {
        let (x, y) = self.extract_features(self.data())?;
        let mut model = self.setup_model();
        self.make_predictions(model.as_mut(), &x, &y, submission_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(train_rows: &[(&str, f64, f64)], test_rows: &[(&str, f64)]) -> CompetitionRunner {
        let columns = vec!["Score".to_string(), LABEL_COLUMN.to_string()];
        let train = Table::new(
            "PostId",
            columns,
            train_rows.iter().map(|(id, _, _)| id.to_string()).collect(),
            train_rows
                .iter()
                .map(|(_, score, label)| vec![score.to_string(), label.to_string()])
                .collect(),
        );
        let test = Table::new(
            "PostId",
            vec!["Score".to_string()],
            test_rows.iter().map(|(id, _)| id.to_string()).collect(),
            test_rows.iter().map(|(_, score)| vec![score.to_string()]).collect(),
        );
        let shape = DatasetShape::new(train_rows.len(), test_rows.len(), 2);
        CompetitionRunner::from_dataset(Dataset::from_tables(train, test, shape).unwrap())
            .with_features(vec!["Score".into()])
            .with_cv_folds(2)
    }

    #[test]
    fn lost_test_rows_are_fatal() {
        let runner = runner(
            &[("1", 0.0, 0.0), ("2", 1.0, 1.0), ("3", 0.1, 0.0), ("4", 0.9, 1.0)],
            &[("8", 0.5), ("9", 0.2)],
        );
        let (x, mut y) = runner.extract_features(runner.data()).unwrap();
        // pretend one test row picked up a label
        let last = y.len() - 1;
        y[last] = 0.0;

        let dir = tempfile::tempdir().unwrap();
        let mut model = runner.setup_model();
        let err = runner
            .make_predictions(model.as_mut(), &x, &y, &dir.path().join("out.csv"))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<RunnerError>(),
            Some(&RunnerError::LostTestSamples {
                expected: 2,
                found: 1
            })
        );
        assert!(err.to_string().contains("lost test samples"));
    }

    #[test]
    fn predictions_follow_test_order() {
        let runner = runner(
            &[
                ("1", 0.0, 0.0),
                ("2", 1.0, 1.0),
                ("3", 0.1, 0.0),
                ("4", 0.9, 1.0),
                ("5", 0.2, 0.0),
                ("6", 0.8, 1.0),
            ],
            &[("20", 0.95), ("10", 0.05)],
        );
        let dir = tempfile::tempdir().unwrap();
        let report = runner.run(&dir.path().join("out.csv")).unwrap();

        assert_eq!(report.model, "LogisticRegression");
        assert_eq!(report.train_samples, 6);
        assert_eq!(report.test_samples, 2);
        assert!(report.predictions[0] > 0.5);
        assert!(report.predictions[1] < 0.5);
        assert_eq!(report.cv_scores.len(), 2);
    }

    #[test]
    fn ragged_labels_are_rejected() {
        let runner = runner(
            &[("1", 0.0, 0.0), ("2", 1.0, 1.0), ("3", 0.1, 0.0), ("4", 0.9, 1.0)],
            &[("8", 0.5), ("9", 0.2)],
        );
        let (x, mut y) = runner.extract_features(runner.data()).unwrap();
        y.pop();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut model = runner.setup_model();
        let err = runner
            .make_predictions(model.as_mut(), &x, &y, &path)
            .unwrap_err();
        assert!(err.to_string().contains("6 feature rows but 5 labels"), "{err}");
        assert!(err.downcast_ref::<RunnerError>().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn infinite_cells_never_reach_the_submission() {
        let runner = runner(
            &[
                ("1", 0.0, 0.0),
                ("2", 1.0, 1.0),
                ("3", f64::INFINITY, 0.0),
                ("4", 0.9, 1.0),
                ("5", 0.2, 0.0),
                ("6", 0.8, 1.0),
            ],
            &[("20", f64::NEG_INFINITY), ("10", 0.05)],
        );
        let dir = tempfile::tempdir().unwrap();
        let report = runner.run(&dir.path().join("out.csv")).unwrap();
        assert_eq!(report.predictions.len(), 2);
        assert!(
            report.predictions.iter().all(|p| (0.0..=1.0).contains(p)),
            "{:?}",
            report.predictions
        );
    }

    #[test]
    fn accuracy_scoring_is_configurable() {
        let runner = runner(
            &[
                ("1", 0.0, 0.0),
                ("2", 1.0, 1.0),
                ("3", 0.1, 0.0),
                ("4", 0.9, 1.0),
                ("5", 0.2, 0.0),
                ("6", 0.8, 1.0),
            ],
            &[("20", 0.95)],
        )
        .with_scoring(Scoring::Accuracy);
        let dir = tempfile::tempdir().unwrap();
        let report = runner.run(&dir.path().join("out.csv")).unwrap();
        assert_eq!(report.cv_scores, vec![1.0, 1.0]);
    }
}
