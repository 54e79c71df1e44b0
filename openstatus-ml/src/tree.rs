//! Tree classifiers: a single CART tree and a random forest, both from smartcore.

use std::fmt;

use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};

use crate::dense::{filled_matrix, Fitted, Labels};
use crate::{Classifier, ModelError, ModelResult};

type TreeModel = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Labels>;
type ForestModel = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Labels>;

/// Growth limits for a single tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeSettings {
    pub max_depth: u16,
    pub min_samples_leaf: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_samples_leaf: 1,
        }
    }
}

/// CART tree on Gini impurity over mean-imputed features.
#[derive(Default)]
pub struct DecisionTree {
    settings: TreeSettings,
    fitted: Option<Fitted<TreeModel>>,
}

impl DecisionTree {
    pub fn new(settings: TreeSettings) -> Self {
        Self {
            settings,
            fitted: None,
        }
    }

    pub fn settings(&self) -> TreeSettings {
        self.settings
    }
}

impl fmt::Debug for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionTree")
            .field("settings", &self.settings)
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> &'static str {
        "DecisionTree"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        self.fitted = None;
        if self.settings.max_depth == 0 || self.settings.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParameter(format!(
                "decision tree needs max_depth and min_samples_leaf of at least 1, got {:?}",
                self.settings
            )));
        }
        let settings = self.settings;
        let fitted = Fitted::train(self.name(), x, y, |imputer, labels| {
            let parameters = DecisionTreeClassifierParameters::default()
                .with_criterion(SplitCriterion::Gini)
                .with_max_depth(settings.max_depth)
                .with_min_samples_leaf(settings.min_samples_leaf);
            TreeModel::fit(&filled_matrix(imputer, x), labels, parameters)
        })?;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ModelError::NotFitted("DecisionTree"))?
            .predict(self.name(), x, |imputer, model| {
                model.predict(&filled_matrix(imputer, x))
            })
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(Self::new(self.settings))
    }
}

/// Trees in a forest unless configured otherwise.
pub const DEFAULT_TREES: u16 = 10;

/// Bagged Gini trees over mean-imputed features.
pub struct RandomForest {
    n_trees: u16,
    fitted: Option<Fitted<ForestModel>>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(DEFAULT_TREES)
    }
}

impl RandomForest {
    pub fn new(n_trees: u16) -> Self {
        Self {
            n_trees,
            fitted: None,
        }
    }

    pub fn n_trees(&self) -> u16 {
        self.n_trees
    }
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomForest")
            .field("n_trees", &self.n_trees)
            .field("fitted", &self.fitted)
            .finish()
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "RandomForest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        self.fitted = None;
        if self.n_trees == 0 {
            return Err(ModelError::InvalidParameter(
                "a random forest needs at least one tree".into(),
            ));
        }
        let n_trees = self.n_trees;
        let fitted = Fitted::train(self.name(), x, y, |imputer, labels| {
            let parameters = RandomForestClassifierParameters::default().with_n_trees(n_trees);
            ForestModel::fit(&filled_matrix(imputer, x), labels, parameters)
        })?;
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        self.fitted
            .as_ref()
            .ok_or(ModelError::NotFitted("RandomForest"))?
            .predict(self.name(), x, |imputer, model| {
                model.predict(&filled_matrix(imputer, x))
            })
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(Self::new(self.n_trees))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::separable_1d;

    #[test]
    fn tree_separates_threshold_data() {
        let (x, y) = separable_1d(100);
        let mut tree = DecisionTree::default();
        tree.fit(&x, &y).unwrap();
        let probabilities = tree.predict_proba(&[x[10].clone(), x[90].clone()]).unwrap();
        assert_eq!(probabilities, vec![0.0, 1.0]);
    }

    #[test]
    fn missing_values_take_the_training_mean() {
        // the mean of the present cells is 5, which sits with the negatives
        let x = vec![vec![1.0], vec![2.0], vec![f64::NAN], vec![8.0], vec![9.0]];
        let y = vec![0.0, 0.0, 0.0, 1.0, 1.0];
        let mut tree = DecisionTree::default();
        tree.fit(&x, &y).unwrap();
        assert_eq!(
            tree.predict_proba(&[vec![f64::NAN], vec![9.0]]).unwrap(),
            vec![0.0, 1.0]
        );
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut tree = DecisionTree::new(TreeSettings {
            max_depth: 0,
            min_samples_leaf: 1,
        });
        assert!(matches!(
            tree.fit(&[vec![0.0], vec![1.0]], &[0.0, 1.0]),
            Err(ModelError::InvalidParameter(_))
        ));
    }

    #[test]
    fn unfitted_tree_refuses_to_predict() {
        assert_eq!(
            DecisionTree::default().predict_proba(&[vec![1.0]]),
            Err(ModelError::NotFitted("DecisionTree"))
        );
    }

    #[test]
    fn forest_separates_threshold_data() {
        let (x, y) = separable_1d(100);
        let mut forest = RandomForest::default();
        forest.fit(&x, &y).unwrap();
        let probabilities = forest.predict_proba(&[x[5].clone(), x[95].clone()]).unwrap();
        assert_eq!(probabilities, vec![0.0, 1.0]);
    }

    #[test]
    fn empty_forest_is_rejected() {
        assert!(matches!(
            RandomForest::new(0).fit(&[vec![0.0], vec![1.0]], &[0.0, 1.0]),
            Err(ModelError::InvalidParameter(_))
        ));
    }
}
