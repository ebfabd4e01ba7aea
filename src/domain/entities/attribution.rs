//! Problem days and their cause attributions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::daily_metrics::Platform;
use crate::domain::values::severity::{Severity, SeverityClass};

/// Which detection policy flagged a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationType {
    /// The restaurant's own 7-day trend broke (drop vs rolling baseline).
    RelativeDrop,
    /// The day sits well below the restaurant's typical level (range median).
    AbsoluteLow,
}

/// One day flagged by the anomaly detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDay {
    pub date: NaiveDate,
    pub sales: f64,
    /// Deviation magnitude in [0, 1]: fraction below the policy's reference.
    pub deviation: f64,
    pub deviation_type: DeviationType,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Holiday,
    OperationalOutage,
    StockIssue,
    Marketing,
    Rating,
    Weekday,
    Weather,
    /// Portion of the deviation the learned model cannot account for.
    MlResidual,
}

/// One scored cause candidate for a problem day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factor {
    pub kind: FactorKind,
    /// Platform the factor applies to, when platform-specific.
    pub platform: Option<Platform>,
    pub description: String,
    /// Signed impact score: negative scores depress sales, positive lift them.
    pub impact_score: f64,
    /// Whether the restaurant can act on this factor. Non-actionable factors
    /// (weather, weekday, holiday) never produce recommendations.
    pub actionable: bool,
}

/// The ranked rule-based explanation of one problem day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribution {
    pub id: String,
    pub restaurant_id: i64,
    pub problem_day: ProblemDay,
    /// Factors in display-priority order (the check battery order).
    pub factors: Vec<Factor>,
    pub severity_class: SeverityClass,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Attribution {
    pub fn new(
        restaurant_id: i64,
        problem_day: ProblemDay,
        factors: Vec<Factor>,
        recommendations: Vec<String>,
    ) -> Self {
        let total: f64 = factors.iter().map(|f| f.impact_score.abs()).sum();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            restaurant_id,
            problem_day,
            factors,
            severity_class: SeverityClass::from_total_impact(total),
            recommendations,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem_day() -> ProblemDay {
        ProblemDay {
            date: NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
            sales: 500_000.0,
            deviation: 0.4,
            deviation_type: DeviationType::RelativeDrop,
            severity: Severity::Significant,
        }
    }

    #[test]
    fn test_severity_class_derives_from_factor_impacts() {
        let factors = vec![
            Factor {
                kind: FactorKind::OperationalOutage,
                platform: Some(Platform::Grab),
                description: "offline 6h".into(),
                impact_score: -50.0,
                actionable: true,
            },
            Factor {
                kind: FactorKind::Weather,
                platform: None,
                description: "heavy rain".into(),
                impact_score: -15.0,
                actionable: false,
            },
        ];
        let attribution = Attribution::new(1, problem_day(), factors, vec![]);
        assert_eq!(attribution.severity_class, SeverityClass::High);
    }

    #[test]
    fn test_empty_factor_list_is_low() {
        let attribution = Attribution::new(1, problem_day(), vec![], vec![]);
        assert_eq!(attribution.severity_class, SeverityClass::Low);
    }

    #[test]
    fn test_opposite_signs_accumulate_by_magnitude() {
        let factors = vec![
            Factor {
                kind: FactorKind::Weather,
                platform: None,
                description: "light rain".into(),
                impact_score: 5.0,
                actionable: false,
            },
            Factor {
                kind: FactorKind::Marketing,
                platform: Some(Platform::Gojek),
                description: "low roas".into(),
                impact_score: -25.0,
                actionable: true,
            },
        ];
        let attribution = Attribution::new(1, problem_day(), factors, vec![]);
        // 5 + 25 = 30 absolute
        assert_eq!(attribution.severity_class, SeverityClass::Moderate);
    }
}
