//! Severity banding shared by the anomaly detector (per-day deviation) and
//! the rule engine (aggregate factor impact).

use serde::{Deserialize, Serialize};

/// Severity of a single problem day, banded on deviation magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Significant,
    Moderate,
    /// Below the surfacing threshold; excluded from results by default.
    Minor,
}

impl Severity {
    /// Band a deviation magnitude (0.0–1.0 relative drop, or ratio below
    /// median for the absolute-low policy).
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation >= 0.50 {
            Severity::Critical
        } else if deviation >= 0.30 {
            Severity::Significant
        } else if deviation >= 0.15 {
            Severity::Moderate
        } else {
            Severity::Minor
        }
    }
}

/// Aggregate severity of an attribution, banded on total absolute impact
/// score across all factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityClass {
    Critical,
    High,
    Moderate,
    Low,
}

impl SeverityClass {
    pub fn from_total_impact(total_abs_impact: f64) -> Self {
        if total_abs_impact >= 70.0 {
            SeverityClass::Critical
        } else if total_abs_impact >= 40.0 {
            SeverityClass::High
        } else if total_abs_impact >= 20.0 {
            SeverityClass::Moderate
        } else {
            SeverityClass::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deviation_bands() {
        assert_eq!(Severity::from_deviation(0.55), Severity::Critical);
        assert_eq!(Severity::from_deviation(0.50), Severity::Critical);
        assert_eq!(Severity::from_deviation(0.35), Severity::Significant);
        assert_eq!(Severity::from_deviation(0.20), Severity::Moderate);
        assert_eq!(Severity::from_deviation(0.10), Severity::Minor);
    }

    #[test]
    fn test_impact_bands() {
        assert_eq!(SeverityClass::from_total_impact(85.0), SeverityClass::Critical);
        assert_eq!(SeverityClass::from_total_impact(55.0), SeverityClass::High);
        assert_eq!(SeverityClass::from_total_impact(25.0), SeverityClass::Moderate);
        assert_eq!(SeverityClass::from_total_impact(5.0), SeverityClass::Low);
    }
}
