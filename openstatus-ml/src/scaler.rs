use crate::{check_width, ModelError, ModelResult};

/// Per-column standardisation that also fills missing values.
///
/// NaN cells are replaced by the training mean, so they map to zero after
/// scaling. Constant columns keep a unit scale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &[Vec<f64>]) -> ModelResult<Self> {
        let width = x.first().ok_or(ModelError::EmptyTrainingSet)?.len();
        check_width(x, width)?;

        let mut sums = vec![0.0; width];
        let mut counts = vec![0usize; width];
        for row in x {
            for (col, value) in row.iter().enumerate() {
                if !value.is_nan() {
                    sums[col] += value;
                    counts[col] += 1;
                }
            }
        }
        let means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
            .collect();

        let mut squares = vec![0.0; width];
        for row in x {
            for (col, value) in row.iter().enumerate() {
                if !value.is_nan() {
                    let delta = value - means[col];
                    squares[col] += delta * delta;
                }
            }
        }
        let scales = squares
            .iter()
            .zip(&counts)
            .map(|(square, &count)| {
                let std = if count == 0 {
                    0.0
                } else {
                    (square / count as f64).sqrt()
                };
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { means, scales })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Replaces NaN cells with the column mean without rescaling.
    pub fn fill_missing(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.means)
            .map(|(&value, &mean)| if value.is_nan() { mean } else { value })
            .collect()
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&value, (&mean, &scale))| {
                if value.is_nan() {
                    0.0
                } else {
                    (value - mean) / scale
                }
            })
            .collect()
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> ModelResult<Vec<Vec<f64>>> {
        check_width(x, self.width())?;
        Ok(x.iter().map(|row| self.transform_row(row)).collect())
    }
}
