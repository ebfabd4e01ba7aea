//! Model explainability: exact contribution decomposition and counterfactual
//! what-if probes over the trained global model.
//!
//! Everything here leans on the additivity of the linear model: the intercept
//! plus the per-feature contributions reconstruct the prediction exactly, so
//! "which features pushed this day down" has one unambiguous answer.

use serde::Serialize;

use crate::domain::error::DomainError;
use crate::domain::values::features::{FeatureVector, FEATURE_NAMES};
use crate::domain::values::regression::TrainedModel;

/// One feature's exact share of the prediction.
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub feature: String,
    /// The raw input value that produced this contribution.
    pub value: f64,
    /// Signed currency amount. Sum over all features + baseline term =
    /// predicted sales, exactly.
    pub contribution: f64,
}

/// The ML half of a day's diagnosis. `Unavailable` keeps the rule engine
/// output usable when no valid model exists.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MlExplanation {
    Available {
        predicted_sales: f64,
        /// Intercept of the model: the fleet-wide expected level before any
        /// feature adjustment.
        baseline_term: f64,
        /// Material contributions, ranked by magnitude, largest first.
        contributions: Vec<Contribution>,
        /// actual − predicted. Large magnitude means the model cannot account
        /// for the day and something outside the features happened.
        residual: f64,
    },
    Unavailable {
        reason: String,
    },
}

/// How a counterfactual probe rewrites one feature.
#[derive(Debug, Clone)]
pub enum FeatureOverride {
    Set(f64),
    Scale(f64),
}

#[derive(Debug, Clone, Serialize)]
pub struct WhatIfResult {
    pub original_prediction: f64,
    pub counterfactual_prediction: f64,
    /// Counterfactual prediction minus the day's actual sales.
    pub delta_vs_actual: f64,
    /// Counterfactual prediction minus the original prediction.
    pub delta_vs_prediction: f64,
}

#[derive(Debug, Clone)]
pub struct ExplainConfig {
    /// Contributions below this fraction of |prediction| are dropped from
    /// the ranked list (they still participate in the additivity identity).
    pub materiality_fraction: f64,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            materiality_fraction: 0.01,
        }
    }
}

pub struct ExplainabilityEngine {
    config: ExplainConfig,
}

impl ExplainabilityEngine {
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    /// Decompose one day's prediction into ranked material contributions.
    pub fn explain(
        &self,
        model: &TrainedModel,
        fv: &FeatureVector,
        actual_sales: f64,
    ) -> Result<MlExplanation, DomainError> {
        let predicted = model.predict(fv)?;
        let raw = model.contributions_for(&fv.values);

        let floor = predicted.abs() * self.config.materiality_fraction;
        let mut contributions: Vec<Contribution> = raw
            .iter()
            .enumerate()
            .filter(|(_, c)| c.abs() >= floor)
            .map(|(i, &c)| Contribution {
                feature: FEATURE_NAMES[i].to_string(),
                value: fv.values[i],
                contribution: c,
            })
            .collect();
        contributions.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(MlExplanation::Available {
            predicted_sales: predicted,
            baseline_term: model.intercept,
            contributions,
            residual: actual_sales - predicted,
        })
    }

    /// Re-predict the day with the named features rewritten.
    ///
    /// Answers questions like "what would sales have been with zero offline
    /// minutes". Only the named features change; correlated features are
    /// deliberately left alone, so the result is the model's marginal view,
    /// not a full scenario simulation. No overrides means the counterfactual
    /// is the original prediction exactly.
    pub fn what_if(
        &self,
        model: &TrainedModel,
        fv: &FeatureVector,
        actual_sales: f64,
        overrides: &[(&str, FeatureOverride)],
    ) -> Result<WhatIfResult, DomainError> {
        let original = model.predict(fv)?;

        let mut counterfactual = fv.clone();
        for (feature, probe) in overrides {
            let current = counterfactual
                .get(feature)
                .ok_or_else(|| DomainError::InvalidInput(format!("unknown feature '{feature}'")))?;
            let rewritten = match probe {
                FeatureOverride::Set(v) => *v,
                FeatureOverride::Scale(factor) => current * factor,
            };
            counterfactual.set(feature, rewritten)?;
        }

        let prediction = model.predict(&counterfactual)?;
        Ok(WhatIfResult {
            original_prediction: original,
            counterfactual_prediction: prediction,
            delta_vs_actual: prediction - actual_sales,
            delta_vs_prediction: prediction - original,
        })
    }
}
