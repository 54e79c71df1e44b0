//! Glue between row-major feature slices and smartcore estimators.

use std::fmt;

use log::debug;
use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::scaler::StandardScaler;
use crate::{check_training_set, check_width, ModelError, ModelResult};

/// Class labels in the form smartcore estimators consume and predict.
pub(crate) type Labels = Vec<u32>;

/// State of a smartcore-backed classifier after `fit`.
pub(crate) enum Fitted<M> {
    /// Every training label was the same, so there is nothing to learn.
    Constant { width: usize, probability: f64 },
    Model { imputer: StandardScaler, model: M },
}

impl<M> Fitted<M> {
    /// Validates `x`/`y`, then trains through `train` unless `y` holds a single class.
    ///
    /// `train` receives the fitted imputer and the labels as `0`/`1`.
    pub(crate) fn train(
        name: &'static str,
        x: &[Vec<f64>],
        y: &[f64],
        train: impl FnOnce(&StandardScaler, &Labels) -> Result<M, Failed>,
    ) -> ModelResult<Self> {
        let width = check_training_set(x, y)?;
        let first = y[0];
        if y.iter().all(|&label| label == first) {
            debug!(
                target: "openstatus_ml::dense",
                "{} saw a single class in {} rows",
                name,
                y.len()
            );
            return Ok(Fitted::Constant {
                width,
                probability: first,
            });
        }

        let imputer = StandardScaler::fit(x)?;
        let labels: Labels = y.iter().map(|&label| u32::from(label == 1.0)).collect();
        let model = train(&imputer, &labels).map_err(|err| ModelError::Training {
            model: name,
            reason: err.to_string(),
        })?;
        debug!(
            target: "openstatus_ml::dense",
            "{} fitted on {} rows x {} features",
            name,
            x.len(),
            width
        );
        Ok(Fitted::Model { imputer, model })
    }

    pub(crate) fn width(&self) -> usize {
        match self {
            Fitted::Constant { width, .. } => *width,
            Fitted::Model { imputer, .. } => imputer.width(),
        }
    }

    /// Predicted labels as probabilities: smartcore reports a class per row,
    /// which becomes `0.0` or `1.0`.
    pub(crate) fn predict(
        &self,
        name: &'static str,
        x: &[Vec<f64>],
        predict: impl FnOnce(&StandardScaler, &M) -> Result<Labels, Failed>,
    ) -> ModelResult<Vec<f64>> {
        check_width(x, self.width())?;
        match self {
            Fitted::Constant { probability, .. } => Ok(vec![*probability; x.len()]),
            Fitted::Model { .. } if x.is_empty() => Ok(Vec::new()),
            Fitted::Model { imputer, model } => {
                let labels = predict(imputer, model).map_err(|err| ModelError::Prediction {
                    model: name,
                    reason: err.to_string(),
                })?;
                Ok(labels.into_iter().map(|label| f64::from(label.min(1))).collect())
            }
        }
    }
}

impl<M> fmt::Debug for Fitted<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fitted::Constant { width, probability } => f
                .debug_struct("Constant")
                .field("width", width)
                .field("probability", probability)
                .finish(),
            Fitted::Model { imputer, .. } => f
                .debug_struct("Model")
                .field("width", &imputer.width())
                .finish_non_exhaustive(),
        }
    }
}

/// Missing cells replaced by the training mean.
pub(crate) fn filled_matrix(imputer: &StandardScaler, x: &[Vec<f64>]) -> DenseMatrix<f64> {
    matrix(x, imputer.width(), |row| imputer.fill_missing(row))
}

/// Standardised features with missing cells at the mean.
pub(crate) fn scaled_matrix(imputer: &StandardScaler, x: &[Vec<f64>]) -> DenseMatrix<f64> {
    matrix(x, imputer.width(), |row| imputer.transform_row(row))
}

/// Non-negative integer counts; negative values clamp to zero.
pub(crate) fn count_matrix(imputer: &StandardScaler, x: &[Vec<f64>]) -> DenseMatrix<u32> {
    matrix(x, imputer.width(), |row| {
        imputer
            .fill_missing(row)
            .into_iter()
            .map(|value| value.round().max(0.0) as u32)
            .collect()
    })
}

fn matrix<T>(x: &[Vec<f64>], width: usize, row: impl Fn(&[f64]) -> Vec<T>) -> DenseMatrix<T>
where
    T: fmt::Debug + fmt::Display + Copy,
{
    let values: Vec<T> = x.iter().flat_map(|features| row(features)).collect();
    DenseMatrix::new(x.len(), width, values, false)
}
