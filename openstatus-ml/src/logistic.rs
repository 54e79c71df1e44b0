use log::debug;

use crate::scaler::StandardScaler;
use crate::{check_training_set, check_width, Classifier, ModelError, ModelResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingSettings {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            epochs: 200,
            learning_rate: 0.3,
            l2: 1e-4,
        }
    }
}

/// Weights and bias over standardised features.
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn feature_count(&self) -> usize {
        self.weights.len()
    }

    pub fn predict_probability(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.weights.len());
        let score = dot(&self.weights, features) + self.bias;
        sigmoid(score)
    }
}

/// Batch gradient descent with L2 regularisation on already-scaled rows.
pub fn train(x: &[Vec<f64>], y: &[f64], settings: TrainingSettings) -> LogisticModel {
    assert!(!x.is_empty(), "training requires at least one sample");
    let feature_len = x[0].len();
    let mut weights = vec![0.0; feature_len];
    let mut bias = 0.0;

    let lr = settings.learning_rate;
    let l2 = settings.l2;
    let m = x.len() as f64;

    for _ in 0..settings.epochs {
        let mut grad_w = vec![0.0; feature_len];
        let mut grad_b = 0.0;

        for (features, label) in x.iter().zip(y) {
            debug_assert_eq!(features.len(), feature_len);
            let prediction = sigmoid(dot(&weights, features) + bias);
            let error = prediction - label;

            for (i, value) in features.iter().enumerate() {
                grad_w[i] += error * value;
            }
            grad_b += error;
        }

        for (i, weight) in weights.iter_mut().enumerate() {
            let grad = grad_w[i] / m + l2 * *weight;
            *weight -= lr * grad;
        }
        bias -= lr * grad_b / m;
    }

    LogisticModel { weights, bias }
}

/// Logistic regression that standardises its inputs before training.
#[derive(Clone, Debug, Default)]
pub struct LogisticRegression {
    settings: TrainingSettings,
    fitted: Option<(StandardScaler, LogisticModel)>,
}

impl LogisticRegression {
    pub fn new(settings: TrainingSettings) -> Self {
        Self {
            settings,
            fitted: None,
        }
    }

    pub fn settings(&self) -> TrainingSettings {
        self.settings
    }

    pub fn model(&self) -> Option<&LogisticModel> {
        self.fitted.as_ref().map(|(_, model)| model)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "LogisticRegression"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> ModelResult<()> {
        check_training_set(x, y)?;
        if self.settings.epochs == 0 || self.settings.learning_rate <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "logistic regression needs epochs > 0 and learning_rate > 0, got {:?}",
                self.settings
            )));
        }

        let scaler = StandardScaler::fit(x)?;
        let scaled = scaler.transform(x)?;
        let model = train(&scaled, y, self.settings);
        debug!(
            target: "openstatus_ml::logistic",
            "fitted weights={:?} bias={:.4}",
            model.weights,
            model.bias
        );
        self.fitted = Some((scaler, model));
        Ok(())
    }

    fn predict_proba(&self, x: &[Vec<f64>]) -> ModelResult<Vec<f64>> {
        let (scaler, model) = self
            .fitted
            .as_ref()
            .ok_or(ModelError::NotFitted("LogisticRegression"))?;
        check_width(x, model.feature_count())?;
        Ok(x
            .iter()
            .map(|row| model.predict_probability(&scaler.transform_row(row)))
            .collect())
    }

    fn boxed_clone(&self) -> Box<dyn Classifier> {
        Box::new(self.clone())
    }
}

pub fn sigmoid(value: f64) -> f64 {
    if value >= 0.0 {
        let z = (-value).exp();
        1.0 / (1.0 + z)
    } else {
        let z = value.exp();
        z / (1.0 + z)
    }
}

fn dot(weights: &[f64], features: &[f64]) -> f64 {
    weights
        .iter()
        .zip(features.iter())
        .map(|(w, f)| w * f)
        .sum()
}
