//! End-to-end diagnosis: detect problem days, attribute causes with the rule
//! battery, and reconcile with the learned model's view.
//!
//! The two explanation paths stay side by side in the report rather than
//! being merged into one score. Rules encode operator knowledge and always
//! run; the model adds a fleet-learned counterweight and a residual that
//! flags days neither path can account for.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::application::detect::AnomalyDetector;
use crate::application::explain::{ExplainabilityEngine, MlExplanation};
use crate::application::features::FeatureBuilder;
use crate::application::fusion::FusionUseCase;
use crate::application::rules::{AttributionInput, RuleAttributionEngine};
use crate::domain::entities::attribution::{Attribution, Factor, FactorKind};
use crate::domain::error::DomainError;
use crate::domain::ports::holidays::HolidayLookup;
use crate::domain::ports::metrics_repository::{MetricsRepository, Restaurant};
use crate::domain::ports::weather::{WeatherLookup, WeatherObservation};
use crate::domain::values::baseline::estimate_series;
use crate::domain::values::regression::TrainedModel;

#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// A negative residual at or above this fraction of the prediction gets
    /// surfaced as an unexplained-shortfall factor.
    pub residual_materiality_fraction: f64,
    /// Impact score assigned to that factor.
    pub residual_impact: f64,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            residual_materiality_fraction: 0.15,
            residual_impact: -20.0,
        }
    }
}

/// One problem day with both explanation paths.
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub rules: Attribution,
    pub ml: MlExplanation,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub restaurant: Restaurant,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Days that actually had platform rows in the range.
    pub days_analyzed: usize,
    pub reports: Vec<DayReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub error: String,
}

/// Per-restaurant isolation: one restaurant's failure never aborts the rest.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub reports: Vec<AnalysisReport>,
    pub failures: Vec<BatchFailure>,
}

pub struct AnalyzeUseCase {
    metrics_repo: Arc<dyn MetricsRepository>,
    fusion: FusionUseCase,
    detector: AnomalyDetector,
    rules: RuleAttributionEngine,
    features: FeatureBuilder,
    explainer: ExplainabilityEngine,
    weather: Arc<dyn WeatherLookup>,
    holidays: Arc<dyn HolidayLookup>,
    model: Option<TrainedModel>,
    config: AnalyzeConfig,
}

impl AnalyzeUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        metrics_repo: Arc<dyn MetricsRepository>,
        fusion: FusionUseCase,
        detector: AnomalyDetector,
        rules: RuleAttributionEngine,
        features: FeatureBuilder,
        explainer: ExplainabilityEngine,
        weather: Arc<dyn WeatherLookup>,
        holidays: Arc<dyn HolidayLookup>,
        model: Option<TrainedModel>,
        config: AnalyzeConfig,
    ) -> Self {
        Self {
            metrics_repo,
            fusion,
            detector,
            rules,
            features,
            explainer,
            weather,
            holidays,
            model,
            config,
        }
    }

    /// Diagnose one restaurant over an inclusive date range.
    pub async fn execute(
        &self,
        restaurant_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnalysisReport, DomainError> {
        let restaurant = self.metrics_repo.restaurant(restaurant_id)?;
        let series = self.fusion.series(restaurant_id, start, end)?;
        let baselines = estimate_series(&series);
        let problems = self.detector.detect(&series, &baselines);

        let mut reports = Vec::with_capacity(problems.len());
        for problem in problems {
            let Some(idx) = series.iter().position(|d| d.date == problem.date) else {
                continue;
            };
            let day = &series[idx];
            let baseline = &baselines[idx];

            let weather = match self.weather.observe(&restaurant.location, day.date).await {
                Ok(w) => w,
                Err(e) => {
                    eprintln!(
                        "WARNING: weather lookup failed for {} on {}: {e}; using fallback",
                        restaurant.location, day.date
                    );
                    WeatherObservation::fallback()
                }
            };
            let holiday = self.holidays.holiday(day.date).unwrap_or_else(|e| {
                eprintln!("WARNING: holiday lookup failed for {}: {e}", day.date);
                None
            });

            let mut attribution = self.rules.attribute(&AttributionInput {
                day,
                problem: &problem,
                baseline,
                weather,
                holiday,
            });

            let ml = match &self.model {
                Some(model) => {
                    let fv = self
                        .features
                        .build(day, baseline, &restaurant.location)
                        .await?;
                    self.explainer.explain(model, &fv, day.total_sales())?
                }
                None => MlExplanation::Unavailable {
                    reason: DomainError::ModelUntrained.to_string(),
                },
            };

            if let Some(factor) = self.residual_factor(&ml) {
                let mut factors = attribution.factors;
                factors.push(factor);
                let recommendations = attribution.recommendations;
                attribution = Attribution::new(
                    restaurant_id,
                    problem.clone(),
                    factors,
                    recommendations,
                );
            }

            reports.push(DayReport {
                date: problem.date,
                rules: attribution,
                ml,
            });
        }

        Ok(AnalysisReport {
            restaurant,
            start,
            end,
            days_analyzed: series.len(),
            reports,
        })
    }

    /// Diagnose every restaurant; collect failures instead of propagating.
    pub async fn execute_batch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BatchOutcome, DomainError> {
        let restaurants = self.metrics_repo.restaurants()?;

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for restaurant in restaurants {
            match self.execute(restaurant.id, start, end).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    eprintln!(
                        "WARNING: analysis failed for restaurant {} ({}): {e}",
                        restaurant.id, restaurant.name
                    );
                    failures.push(BatchFailure {
                        restaurant_id: restaurant.id,
                        restaurant_name: restaurant.name,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(BatchOutcome { reports, failures })
    }

    /// A material negative residual means the day's shortfall exceeds what
    /// the features can explain.
    fn residual_factor(&self, ml: &MlExplanation) -> Option<Factor> {
        let MlExplanation::Available {
            predicted_sales,
            residual,
            ..
        } = ml
        else {
            return None;
        };
        if *residual >= 0.0 || predicted_sales.abs() <= 0.0 {
            return None;
        }
        if residual.abs() < predicted_sales.abs() * self.config.residual_materiality_fraction {
            return None;
        }
        Some(Factor {
            kind: FactorKind::MlResidual,
            platform: None,
            description: format!(
                "Sales fell {:.0} short of the model's expectation for this day's conditions",
                residual.abs()
            ),
            impact_score: self.config.residual_impact,
            actionable: false,
        })
    }
}
