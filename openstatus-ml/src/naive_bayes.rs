use std::fmt;

use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::naive_bayes::gaussian::GaussianNB;
use smartcore::naive_bayes::multinomial::MultinomialNB;

use crate::dense::{count_matrix, filled_matrix, Fitted, Labels};
use crate::scaler::StandardScaler;
use crate::{Classifier, ModelError, ModelResult};

type GaussianModel = GaussianNB<f64, u32, DenseMatrix<f64>, Labels>;
type MultinomialModel = MultinomialNB<u32, u32, DenseMatrix<u32>, Labels>;

/// Gaussian naive Bayes (smartcore) over mean-imputed features.
#[derive(Default)]
pub struct GaussianNaiveBayes {
    fitted: Option<Fitted<GaussianModel>>,
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for GaussianNaiveBayes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaussianNaiveBayes")
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl Classifier for GaussianNaiveBayes {
    fn name(&self) -> &'static str {
        "GaussianNaiveBayes"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        self.fitted = None;
        let fitted = Fitted::train(self.name(), x, y, |imputer, labels| {
            check_class_variance(imputer, x, labels)?;
            GaussianModel::fit(&filled_matrix(imputer, x), labels, Default::default())
        })?;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ModelError::NotFitted("GaussianNaiveBayes"))?
            .predict(self.name(), x, |imputer, model| {
                model.predict(&filled_matrix(imputer, x))
            })
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(Self::new())
    }
}

/// A zero within-class variance makes every Gaussian log-likelihood NaN.
fn check_class_variance(
    imputer: &StandardScaler,
    x: &[Vec<f64>],
    labels: &Labels,
) -> Result<(), Failed> {
    for class in [0, 1] {
        for column in 0..imputer.width() {
            let values: Vec<f64> = x
                .iter()
                .zip(labels)
                .filter(|(_, label)| **label == class)
                .map(|(row, _)| {
                    let value = row[column];
                    if value.is_nan() {
                        imputer.means()[column]
                    } else {
                        value
                    }
                })
                .collect();
            let Some(&first) = values.first() else {
                continue;
            };
            if values.iter().all(|&value| value == first) {
                return Err(Failed::fit(&format!(
                    "feature {column} is constant within class {class}"
                )));
            }
        }
    }
    Ok(())
}

/// Multinomial naive Bayes (smartcore, additive smoothing `alpha = 1`) over
/// features read as non-negative counts.
#[derive(Default)]
pub struct MultinomialNaiveBayes {
    fitted: Option<Fitted<MultinomialModel>>,
}

impl MultinomialNaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for MultinomialNaiveBayes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultinomialNaiveBayes")
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn name(&self) -> &'static str {
        "MultinomialNaiveBayes"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        self.fitted = None;
        let fitted = Fitted::train(self.name(), x, y, |imputer, labels| {
            MultinomialModel::fit(&count_matrix(imputer, x), labels, Default::default())
        })?;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ModelError::NotFitted("MultinomialNaiveBayes"))?
            .predict(self.name(), x, |imputer, model| {
                model.predict(&count_matrix(imputer, x))
            })
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(Self::new())
    }
}
