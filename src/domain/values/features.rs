//! The feature contract shared between model training and inference.
//!
//! [`FEATURE_NAMES`] is versioned by content: any change to the list (names,
//! order, count) invalidates every persisted model, and inference rejects a
//! manifest that disagrees with it. Keep additions at the end and retrain.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

pub const FEATURE_COUNT: usize = 21;

/// Ordered feature names. The single source of truth for vector layout.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Operational
    "grab_offline_minutes",
    "gojek_offline_minutes",
    "grab_driver_wait_minutes",
    "gojek_driver_wait_minutes",
    "prep_minutes",
    "delivery_minutes",
    // Marketing
    "grab_roas",
    "gojek_roas",
    "ads_spend_total",
    "impressions_total",
    // Quality
    "grab_rating",
    "gojek_rating",
    // Calendar
    "day_of_week",
    "is_weekend",
    "is_holiday",
    // External
    "precipitation_mm",
    "temperature_c",
    "tourism_index",
    // Trend (strictly backward-looking)
    "sales_7d_avg",
    "sales_30d_avg",
    "sales_gradient_7d",
];

/// Index of a feature name within the contract.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

/// Fixed-schema numeric feature vector for one (restaurant, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub restaurant_id: i64,
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(restaurant_id: i64, date: NaiveDate, values: Vec<f64>) -> Result<Self, DomainError> {
        if values.len() != FEATURE_COUNT {
            return Err(DomainError::InvalidInput(format!(
                "feature vector has {} values, contract requires {}",
                values.len(),
                FEATURE_COUNT
            )));
        }
        Ok(Self {
            restaurant_id,
            date,
            values,
        })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<(), DomainError> {
        let i = feature_index(name)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown feature '{name}'")))?;
        self.values[i] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_has_no_duplicate_names() {
        let mut names: Vec<_> = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_get_set_by_name() {
        let mut fv = FeatureVector::new(
            1,
            NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
            vec![0.0; FEATURE_COUNT],
        )
        .unwrap();
        fv.set("precipitation_mm", 12.5).unwrap();
        assert_eq!(fv.get("precipitation_mm"), Some(12.5));
        assert!(fv.set("no_such_feature", 1.0).is_err());
        assert_eq!(fv.get("no_such_feature"), None);
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let result = FeatureVector::new(
            1,
            NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
            vec![0.0; 3],
        );
        assert!(result.is_err());
    }
}
