use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::metrics::{accuracy, roc_auc};
use crate::{Classifier, ModelError, ModelResult};

/// How each validation fold is scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    #[default]
    RocAuc,
    /// Accuracy at a 0.5 probability threshold.
    Accuracy,
}

impl Scoring {
    pub fn label(&self) -> &'static str {
        match self {
            Scoring::RocAuc => "AUC",
            Scoring::Accuracy => "accuracy",
        }
    }

    pub fn score(&self, probabilities: &[f64], labels: &[f64]) -> f64 {
        match self {
            Scoring::RocAuc => roc_auc(probabilities, labels),
            Scoring::Accuracy => accuracy(probabilities, labels, 0.5),
        }
    }
}

/// Splits row indices into `k` unshuffled validation folds that keep the
/// class balance of `labels`.
///
/// Each class is cut into `k` contiguous chunks in row order (the first
/// `len % k` chunks one row longer); fold `i` is the union of every class's
/// chunk `i`, returned in ascending row order.
pub fn stratified_k_fold(labels: &[f64], k: usize) -> ModelResult<Vec<Vec<usize>>> {
    if k < 2 || labels.len() < k {
        return Err(ModelError::InvalidParameter(format!(
            "cannot split {} rows into {} folds",
            labels.len(),
            k
        )));
    }

    let mut folds = vec![Vec::new(); k];
    for class in [0.0, 1.0] {
        let members: Vec<usize> = (0..labels.len())
            .filter(|&row| labels[row] == class)
            .collect();
        let base = members.len() / k;
        let extra = members.len() % k;
        let mut start = 0;
        for (fold, rows) in folds.iter_mut().enumerate() {
            let size = base + usize::from(fold < extra);
            rows.extend_from_slice(&members[start..start + size]);
            start += size;
        }
    }
    for rows in folds.iter_mut() {
        rows.sort_unstable();
    }
    Ok(folds)
}

/// Fits a fresh copy of `classifier` on all but one fold and scores the
/// held-out fold, once per fold.
pub fn cross_val_score(
    classifier: &dyn Classifier,
    x: &[Vec<f64>],
    y: &[f64],
    folds: usize,
    scoring: Scoring,
) -> ModelResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(ModelError::LengthMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }

    let splits = stratified_k_fold(y, folds)?;
    let mut scores = Vec::with_capacity(splits.len());
    let mut in_validation = vec![false; y.len()];

    for (fold, validation) in splits.iter().enumerate() {
        in_validation.iter_mut().for_each(|flag| *flag = false);
        for &row in validation {
            in_validation[row] = true;
        }

        let (mut train_x, mut train_y) = (Vec::new(), Vec::new());
        for row in (0..y.len()).filter(|&row| !in_validation[row]) {
            train_x.push(x[row].clone());
            train_y.push(y[row]);
        }
        let validation_x: Vec<Vec<f64>> = validation.iter().map(|&row| x[row].clone()).collect();
        let validation_y: Vec<f64> = validation.iter().map(|&row| y[row]).collect();

        let mut model = classifier.boxed_clone();
        model.fit(&train_x, &train_y)?;
        let probabilities = model.predict_proba(&validation_x)?;
        let score = scoring.score(&probabilities, &validation_y);
        debug!(
            target: "openstatus_ml::validation",
            "fold {}/{}: trained on {} rows, {} {:.4} on {} rows",
            fold + 1,
            splits.len(),
            train_y.len(),
            scoring.label(),
            score,
            validation_y.len()
        );
        scores.push(score);
    }

    info!(
        target: "openstatus_ml::validation",
        "{}-fold {} for {}: {:?}",
        scores.len(),
        scoring.label(),
        classifier.name(),
        scores
    );
    Ok(scores)
}
