//! Ridge regression over standardized features.
//!
//! The global sales model is deliberately linear: with
//! `y = intercept + Σ wᵢ·(xᵢ − μᵢ)/σᵢ`, the per-feature term
//! `wᵢ·(xᵢ − μᵢ)/σᵢ` is an exact signed contribution, and the contributions
//! plus the intercept reconstruct the prediction bit-for-bit. That additivity
//! is the contract the explainability engine builds on, so a tree ensemble
//! with approximate attributions is not a drop-in replacement here.
//!
//! Fitting solves the regularized normal equations
//! `(ZᵀZ + λnI)·w = Zᵀ(y − ȳ)` with Gaussian elimination; at ~21 features the
//! system is tiny and a dense solve is exact and deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::values::features::{FeatureVector, FEATURE_NAMES};

/// Evaluation metrics reported after training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub mae: f64,
    pub r2: f64,
    /// Mean absolute percentage error with each sample's error capped
    /// (default 1000%) so near-zero-sales days cannot blow up the average.
    pub mape_clipped: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// A trained global sales model: standardization parameters, weights and the
/// feature-name manifest it was fitted against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub feature_names: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub metrics: ModelMetrics,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Verify the persisted manifest against the current feature contract.
    /// A mismatch is fatal for the ML path: the model must be retrained.
    pub fn validate_manifest(&self) -> Result<(), DomainError> {
        if self.feature_names.len() != FEATURE_NAMES.len()
            || self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .any(|(a, b)| a != b)
        {
            let detail = self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES.iter())
                .find(|(a, b)| a.as_str() != **b)
                .map(|(a, b)| format!("first divergence: manifest '{a}' vs contract '{b}'"))
                .unwrap_or_else(|| "name lists differ in length".to_string());
            return Err(DomainError::ModelFeatureMismatch {
                expected: FEATURE_NAMES.len(),
                found: self.feature_names.len(),
                detail,
            });
        }
        Ok(())
    }

    /// Predict total sales for one feature vector.
    pub fn predict(&self, fv: &FeatureVector) -> Result<f64, DomainError> {
        self.validate_manifest()?;
        Ok(self.predict_values(&fv.values))
    }

    pub(crate) fn predict_values(&self, values: &[f64]) -> f64 {
        self.intercept
            + values
                .iter()
                .enumerate()
                .map(|(i, x)| self.weights[i] * (x - self.means[i]) / self.stds[i])
                .sum::<f64>()
    }

    /// Signed per-feature contributions; these sum with `intercept` to the
    /// exact prediction.
    pub fn contributions_for(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, x)| self.weights[i] * (x - self.means[i]) / self.stds[i])
            .collect()
    }
}

/// Fit a ridge model on (rows, targets). Rows must already be chronologically
/// ordered by the caller; this function does not split or shuffle.
pub fn fit_ridge(
    rows: &[Vec<f64>],
    targets: &[f64],
    lambda: f64,
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>, f64), DomainError> {
    let n = rows.len();
    if n == 0 || n != targets.len() {
        return Err(DomainError::InvalidInput(
            "ridge fit requires a non-empty, aligned sample".into(),
        ));
    }
    let k = rows[0].len();
    if rows.iter().any(|r| r.len() != k) {
        return Err(DomainError::InvalidInput("ragged feature rows".into()));
    }

    // Column standardization. A constant column gets std 1.0 so its
    // standardized values are all zero and its weight stays zero.
    let mut means = vec![0.0; k];
    for row in rows {
        for (j, x) in row.iter().enumerate() {
            means[j] += x;
        }
    }
    for m in means.iter_mut() {
        *m /= n as f64;
    }
    let mut stds = vec![0.0; k];
    for row in rows {
        for (j, x) in row.iter().enumerate() {
            stds[j] += (x - means[j]).powi(2);
        }
    }
    for s in stds.iter_mut() {
        *s = (*s / n as f64).sqrt();
        if *s < 1e-9 {
            *s = 1.0;
        }
    }

    let y_mean = targets.iter().sum::<f64>() / n as f64;

    // Gram matrix ZᵀZ + λnI and moment vector Zᵀ(y − ȳ).
    let mut gram = vec![vec![0.0; k]; k];
    let mut moment = vec![0.0; k];
    for (row, &y) in rows.iter().zip(targets) {
        let z: Vec<f64> = (0..k).map(|j| (row[j] - means[j]) / stds[j]).collect();
        for a in 0..k {
            moment[a] += z[a] * (y - y_mean);
            for b in a..k {
                gram[a][b] += z[a] * z[b];
            }
        }
    }
    for a in 0..k {
        for b in 0..a {
            gram[a][b] = gram[b][a];
        }
        gram[a][a] += lambda * n as f64;
    }

    let weights = solve_linear(gram, moment)?;
    Ok((weights, means, stds, y_mean))
}

/// Dense Gaussian elimination with partial pivoting.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, DomainError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(DomainError::InvalidInput(
                "singular system in ridge fit; increase regularization".into(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let ratio = a[row][col] / a[col][col];
            if ratio == 0.0 {
                continue;
            }
            for j in col..n {
                a[row][j] -= ratio * a[col][j];
            }
            b[row] -= ratio * b[col];
        }
    }
    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for j in col + 1..n {
            sum -= a[col][j] * x[j];
        }
        x[col] = sum / a[col][col];
    }
    Ok(x)
}

/// Compute MAE, R² and clipped MAPE for predictions against actuals.
pub fn evaluate(
    predictions: &[f64],
    actuals: &[f64],
    mape_cap: f64,
    n_train: usize,
) -> ModelMetrics {
    let n = actuals.len();
    let mae = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / n.max(1) as f64;

    let mean_actual = actuals.iter().sum::<f64>() / n.max(1) as f64;
    let ss_tot: f64 = actuals.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (a - p).powi(2))
        .sum();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    let mape_clipped = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| {
            if a.abs() > 0.0 {
                ((p - a).abs() / a.abs()).min(mape_cap)
            } else {
                mape_cap
            }
        })
        .sum::<f64>()
        / n.max(1) as f64;

    ModelMetrics {
        mae,
        r2,
        mape_clipped,
        n_train,
        n_test: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::features::FEATURE_COUNT;
    use chrono::NaiveDate;

    fn model_from_fit(rows: &[Vec<f64>], targets: &[f64]) -> TrainedModel {
        let (weights, means, stds, intercept) = fit_ridge(rows, targets, 1e-6).unwrap();
        TrainedModel {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            means,
            stds,
            weights,
            intercept,
            metrics: ModelMetrics {
                mae: 0.0,
                r2: 1.0,
                mape_clipped: 0.0,
                n_train: rows.len(),
                n_test: 0,
            },
            trained_at: Utc::now(),
        }
    }

    /// Synthetic linear data over the full 21-feature layout: target depends
    /// on features 0 and 18 only.
    fn synthetic() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for i in 0..120 {
            let mut v = vec![0.0; FEATURE_COUNT];
            v[0] = (i % 13) as f64 * 10.0;
            v[18] = 1000.0 + (i % 29) as f64 * 50.0;
            v[12] = (i % 7) as f64;
            rows.push(v.clone());
            targets.push(2.0 * v[18] - 300.0 * (v[0] / 10.0) + 5000.0);
        }
        (rows, targets)
    }

    #[test]
    fn test_recovers_linear_relationship() {
        let (rows, targets) = synthetic();
        let model = model_from_fit(&rows, &targets);
        for (row, target) in rows.iter().zip(&targets).take(10) {
            let pred = model.predict_values(row);
            assert!(
                (pred - target).abs() < 1.0,
                "prediction {pred} too far from {target}"
            );
        }
    }

    #[test]
    fn test_contributions_sum_to_prediction() {
        let (rows, targets) = synthetic();
        let model = model_from_fit(&rows, &targets);
        let row = &rows[17];
        let total: f64 = model.contributions_for(row).iter().sum();
        let pred = model.predict_values(row);
        assert!((total + model.intercept - pred).abs() < 1e-9);
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let (rows, targets) = synthetic();
        let model = model_from_fit(&rows, &targets);
        // Feature 5 is constant zero in the synthetic data.
        assert!(model.weights[5].abs() < 1e-6);
    }

    #[test]
    fn test_manifest_mismatch_rejected() {
        let (rows, targets) = synthetic();
        let mut model = model_from_fit(&rows, &targets);
        model.feature_names[3] = "renamed_feature".into();
        assert!(matches!(
            model.validate_manifest(),
            Err(DomainError::ModelFeatureMismatch { .. })
        ));

        let fv = FeatureVector::new(
            1,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            vec![0.0; FEATURE_COUNT],
        )
        .unwrap();
        assert!(model.predict(&fv).is_err());
    }

    #[test]
    fn test_metrics_perfect_fit() {
        let actuals = vec![100.0, 200.0, 300.0];
        let m = evaluate(&actuals, &actuals, 10.0, 3);
        assert_eq!(m.mae, 0.0);
        assert!((m.r2 - 1.0).abs() < 1e-12);
        assert_eq!(m.mape_clipped, 0.0);
    }

    #[test]
    fn test_mape_clipped_on_zero_sales_day() {
        let predictions = vec![500.0];
        let actuals = vec![0.0];
        let m = evaluate(&predictions, &actuals, 10.0, 1);
        assert_eq!(m.mape_clipped, 10.0);
    }

    #[test]
    fn test_empty_fit_rejected() {
        assert!(fit_ridge(&[], &[], 1.0).is_err());
    }
}
