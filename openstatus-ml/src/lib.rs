//! Probabilistic binary classifiers and the evaluation helpers used to score them.

use std::fmt;

use thiserror::Error;

mod dense;
pub mod logistic;
pub mod metrics;
pub mod model;
pub mod naive_bayes;
pub mod neighbors;
pub mod scaler;
pub mod tree;
pub mod validation;

pub use logistic::{LogisticModel, LogisticRegression, TrainingSettings};
pub use metrics::{accuracy, mean, roc_auc, standard_deviation};
pub use model::ModelKind;
pub use naive_bayes::{GaussianNaiveBayes, MultinomialNaiveBayes};
pub use neighbors::KNeighbors;
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, RandomForest, TreeSettings};
pub use validation::{cross_val_score, stratified_k_fold, Scoring};

/// Errors reported by the classifiers and evaluation helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("training requires at least one sample")]
    EmptyTrainingSet,
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("label {0} is not 0 or 1")]
    InvalidLabel(f64),
    #[error("expected {expected} features per row, found {found}")]
    FeatureCountMismatch { expected: usize, found: usize },
    #[error("{0} must be fitted before predicting")]
    NotFitted(&'static str),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("feature {column} of row {row} is not finite: {value}")]
    NonFiniteFeature { row: usize, column: usize, value: f64 },
    #[error("{model} failed to train: {reason}")]
    Training { model: &'static str, reason: String },
    #[error("{model} failed to predict: {reason}")]
    Prediction { model: &'static str, reason: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// A binary classifier that can be fitted and then report `P(label = 1)`.
pub trait Classifier: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Fits on row-major features `x` and labels `y` (each 0 or 1).
    ///
    /// Refitting discards any previous fit.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()>;

    /// Probability of the positive class for each row, within `[0, 1]`.
    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>>;

    /// Copy with the same parameters, used to fit independent folds.
    ///
    /// The copy need not carry the fitted state over.
    fn boxed_clone(&self) -> Box<dyn Classifier>;
}

/// Validates a training set and returns its feature width.
pub(crate) fn check_training_set(x: &[Vec<f64>], y: &[f64]) -> ModelResult<usize> {
    if x.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }
    if let Some(&label) = y.iter().find(|&&label| label != 0.0 && label != 1.0) {
        return Err(ModelError::InvalidLabel(label));
    }
    let width = x[0].len();
    check_width(x, width)?;
    Ok(width)
}

/// Checks every row has `expected` features and none is infinite.
///
/// NaN stays allowed; it marks a missing cell.
pub(crate) fn check_width(x: &[Vec<f64>], expected: usize) -> ModelResult<()> {
    for (row, features) in x.iter().enumerate() {
        if features.len() != expected {
            return Err(ModelError::FeatureCountMismatch {
                expected,
                found: features.len(),
            });
        }
        if let Some((column, &value)) = features
            .iter()
            .enumerate()
            .find(|(_, value)| value.is_infinite())
        {
            return Err(ModelError::NonFiniteFeature { row, column, value });
        }
    }
    Ok(())
}
