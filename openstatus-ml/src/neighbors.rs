use std::fmt;

use log::trace;
use smartcore::algorithm::neighbour::KNNAlgorithmName;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::metrics::distance::euclidian::Euclidian;
use smartcore::neighbors::knn_classifier::{KNNClassifier, KNNClassifierParameters};

use crate::dense::{scaled_matrix, Fitted, Labels};
use crate::{Classifier, ModelError, ModelResult};

pub const DEFAULT_NEIGHBORS: usize = 5;

type KnnModel = KNNClassifier<f64, u32, DenseMatrix<f64>, Labels, Euclidian<f64>>;

/// k-nearest neighbours (smartcore, brute-force search, uniform votes) on
/// standardised features.
pub struct KNeighbors {
    k: usize,
    fitted: Option<Fitted<KnnModel>>,
}

impl Default for KNeighbors {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBORS)
    }
}

impl KNeighbors {
    pub fn new(k: usize) -> Self {
        Self { k, fitted: None }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl fmt::Debug for KNeighbors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KNeighbors")
            .field("k", &self.k)
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl Classifier for KNeighbors {
    fn name(&self) -> &'static str {
        "KNeighbors"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        self.fitted = None;
        if self.k < 2 {
            return Err(ModelError::InvalidParameter(format!(
                "k must be at least 2, got {}",
                self.k
            )));
        }
        // never ask for more neighbours than there are points
        let k = self.k.min(x.len());
        trace!(
            target: "openstatus_ml::neighbors",
            "indexing {} points (k={})",
            x.len(),
            k
        );
        let fitted = Fitted::train(self.name(), x, y, |imputer, labels| {
            let parameters = KNNClassifierParameters::default()
                .with_k(k)
                .with_algorithm(KNNAlgorithmName::LinearSearch);
            KnnModel::fit(&scaled_matrix(imputer, x), labels, parameters)
        })?;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ModelError::NotFitted("KNeighbors"))?
            .predict(self.name(), x, |imputer, model| {
                model.predict(&scaled_matrix(imputer, x))
            })
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(Self::new(self.k))
    }
}
