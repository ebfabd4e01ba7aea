//! Global model training: one ridge model fitted on every restaurant's
//! history pooled together.
//!
//! Pooling is the point — a single restaurant rarely has enough problem days
//! to learn from, but the fleet does, and the trend features keep the model
//! honest about each restaurant's own level.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::application::features::FeatureBuilder;
use crate::application::fusion::FusionUseCase;
use crate::domain::error::DomainError;
use crate::domain::ports::metrics_repository::MetricsRepository;
use crate::domain::ports::model_store::ModelStore;
use crate::domain::values::baseline::estimate_series;
use crate::domain::values::features::{FeatureVector, FEATURE_NAMES};
use crate::domain::values::regression::{evaluate, fit_ridge, TrainedModel};

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub lambda: f64,
    /// Fraction of the pooled sample held out chronologically for evaluation.
    pub test_fraction: f64,
    /// Per-sample cap applied to the MAPE metric.
    pub mape_cap: f64,
    /// Refuse to fit on fewer pooled samples than this.
    pub min_samples: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            test_fraction: 0.10,
            mape_cap: 10.0,
            min_samples: 60,
        }
    }
}

/// Summary of a training run, suitable for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub restaurants_used: usize,
    pub restaurants_skipped: usize,
    pub samples: usize,
    pub model: TrainedModel,
}

pub struct TrainUseCase {
    metrics_repo: Arc<dyn MetricsRepository>,
    fusion: FusionUseCase,
    features: FeatureBuilder,
    model_store: Arc<dyn ModelStore>,
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(
        metrics_repo: Arc<dyn MetricsRepository>,
        fusion: FusionUseCase,
        features: FeatureBuilder,
        model_store: Arc<dyn ModelStore>,
        config: TrainConfig,
    ) -> Self {
        Self {
            metrics_repo,
            fusion,
            features,
            model_store,
            config,
        }
    }

    /// Train on every restaurant's fused history over the range, evaluate on
    /// a chronological holdout, and persist the artifact.
    ///
    /// Rows without a full rolling baseline (the first days of each
    /// restaurant's history) are excluded from training rather than
    /// zero-filled; a restaurant whose entire range fails to fuse is skipped
    /// with a warning instead of failing the run.
    pub async fn execute(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TrainReport, DomainError> {
        let restaurants = self.metrics_repo.restaurants()?;
        if restaurants.is_empty() {
            return Err(DomainError::DataNotFound(
                "no restaurants available for training".into(),
            ));
        }

        let mut samples: Vec<(FeatureVector, f64)> = Vec::new();
        let mut used = 0usize;
        let mut skipped = 0usize;

        for restaurant in &restaurants {
            let series = match self.fusion.series(restaurant.id, start, end) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!(
                        "WARNING: skipping restaurant {} ({}) in training: {e}",
                        restaurant.id, restaurant.name
                    );
                    skipped += 1;
                    continue;
                }
            };
            let baselines = estimate_series(&series);

            let mut contributed = false;
            for (day, baseline) in series.iter().zip(&baselines) {
                // Thin-history rows have no honest trend signal.
                if baseline.rolling_7d_avg.is_none() || baseline.rolling_30d_avg.is_none() {
                    continue;
                }
                let fv = self
                    .features
                    .build(day, baseline, &restaurant.location)
                    .await?;
                samples.push((fv, day.total_sales()));
                contributed = true;
            }
            if contributed {
                used += 1;
            } else {
                skipped += 1;
            }
        }

        if samples.len() < self.config.min_samples {
            return Err(DomainError::InvalidInput(format!(
                "training needs at least {} samples, pooled only {}",
                self.config.min_samples,
                samples.len()
            )));
        }

        // Chronological split: the holdout is strictly the latest slice, so
        // evaluation never peeks into the training period.
        samples.sort_by(|a, b| a.0.date.cmp(&b.0.date));
        let n_test = ((samples.len() as f64 * self.config.test_fraction).round() as usize)
            .clamp(1, samples.len() - 1);
        let n_train = samples.len() - n_test;

        let rows: Vec<Vec<f64>> = samples[..n_train]
            .iter()
            .map(|(fv, _)| fv.values.clone())
            .collect();
        let targets: Vec<f64> = samples[..n_train].iter().map(|(_, y)| *y).collect();
        let (weights, means, stds, intercept) = fit_ridge(&rows, &targets, self.config.lambda)?;

        let mut model = TrainedModel {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            means,
            stds,
            weights,
            intercept,
            metrics: evaluate(&[], &[], self.config.mape_cap, n_train),
            trained_at: Utc::now(),
        };

        let predictions: Vec<f64> = samples[n_train..]
            .iter()
            .map(|(fv, _)| model.predict_values(&fv.values))
            .collect();
        let actuals: Vec<f64> = samples[n_train..].iter().map(|(_, y)| *y).collect();
        model.metrics = evaluate(&predictions, &actuals, self.config.mape_cap, n_train);

        self.model_store.save(&model)?;

        Ok(TrainReport {
            restaurants_used: used,
            restaurants_skipped: skipped,
            samples: samples.len(),
            model,
        })
    }
}
