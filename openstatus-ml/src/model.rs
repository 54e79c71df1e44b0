use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logistic::{LogisticRegression, TrainingSettings};
use crate::naive_bayes::{GaussianNaiveBayes, MultinomialNaiveBayes};
use crate::neighbors::KNeighbors;
use crate::tree::{DecisionTree, RandomForest, TreeSettings};
use crate::Classifier;

/// Menu of classifiers available to a competition run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    LogisticRegression,
    GaussianNaiveBayes,
    MultinomialNaiveBayes,
    KNeighbors,
    DecisionTree,
    RandomForest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::LogisticRegression,
        ModelKind::GaussianNaiveBayes,
        ModelKind::MultinomialNaiveBayes,
        ModelKind::KNeighbors,
        ModelKind::DecisionTree,
        ModelKind::RandomForest,
    ];

    /// Unfitted classifier with default parameters.
    pub fn build(self) -> Box<dyn Classifier> {
        match self {
            ModelKind::LogisticRegression => {
                Box::new(LogisticRegression::new(TrainingSettings::default()))
            }
            ModelKind::GaussianNaiveBayes => Box::new(GaussianNaiveBayes::new()),
            ModelKind::MultinomialNaiveBayes => Box::new(MultinomialNaiveBayes::new()),
            ModelKind::KNeighbors => Box::new(KNeighbors::default()),
            ModelKind::DecisionTree => Box::new(DecisionTree::new(TreeSettings::default())),
            ModelKind::RandomForest => Box::new(RandomForest::default()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::GaussianNaiveBayes => "gaussian_naive_bayes",
            ModelKind::MultinomialNaiveBayes => "multinomial_naive_bayes",
            ModelKind::KNeighbors => "k_neighbors",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
