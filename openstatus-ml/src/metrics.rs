/// Area under the ROC curve, with tied scores sharing their average rank.
///
/// Returns 0.5 when `labels` holds a single class.
pub fn roc_auc(scores: &[f64], labels: &[f64]) -> f64 {
    debug_assert_eq!(scores.len(), labels.len());
    let n = scores.len();

    let n_pos = labels.iter().filter(|&&label| label > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[indices[j]] == scores[indices[i]] {
            j += 1;
        }

        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in indices.iter().take(j).skip(i) {
            if labels[idx] > 0.5 {
                rank_sum_pos += avg_rank;
            }
        }

        i = j;
    }

    let n_pos_f = n_pos as f64;
    let n_neg_f = n_neg as f64;
    (rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg_f)
}

/// Fraction of rows where `probability >= threshold` agrees with the label.
pub fn accuracy(probabilities: &[f64], labels: &[f64], threshold: f64) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }

    let correct = probabilities
        .iter()
        .zip(labels)
        .filter(|(prob, label)| (**prob >= threshold) == (**label > 0.5))
        .count();

    correct as f64 / probabilities.len() as f64
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().sum::<f64>() / values.len() as f64
}

pub fn standard_deviation(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - mean;
            delta * delta
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
