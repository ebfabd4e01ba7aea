//! Problem-day detection over a fused series.
//!
//! Two independent policies run side by side and their hits are merged:
//!
//! - *Relative drop* catches a break in the restaurant's own 7-day trend.
//! - *Absolute low* catches chronic underperformance against the range
//!   median, which the rolling baseline normalizes away.
//!
//! A single threshold misses one or the other; the duality is deliberate.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::entities::attribution::{DeviationType, ProblemDay};
use crate::domain::entities::daily_metrics::DailyMetrics;
use crate::domain::values::baseline::Baseline;
use crate::domain::values::severity::Severity;

/// Detection thresholds. Defaults match the production tuning; both are
/// fractions in (0, 1).
#[derive(Debug, Clone, Serialize)]
pub struct DetectorConfig {
    /// Flag when (baseline − sales)/baseline reaches this fraction.
    pub relative_drop_threshold: f64,
    /// Flag days below this fraction of the range median.
    pub absolute_low_ratio: f64,
    /// Surface Minor-severity days too (off by default).
    pub include_minor: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            relative_drop_threshold: 0.20,
            absolute_low_ratio: 0.70,
            include_minor: false,
        }
    }
}

pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Flag problem days for a date-sorted series with aligned baselines.
    ///
    /// Deterministic for identical input: results are deduplicated by date
    /// and ordered by descending deviation, date ascending on ties.
    pub fn detect(&self, series: &[DailyMetrics], baselines: &[Baseline]) -> Vec<ProblemDay> {
        debug_assert_eq!(series.len(), baselines.len());

        let mut flagged_dates = HashSet::new();
        let mut problems = Vec::new();

        // Policy 1: relative drop against the restaurant's own rolling trend.
        for (day, baseline) in series.iter().zip(baselines) {
            let Some(avg_7d) = baseline.rolling_7d_avg else {
                continue;
            };
            if avg_7d <= 0.0 {
                continue;
            }
            let deviation = (avg_7d - day.total_sales()) / avg_7d;
            if deviation >= self.config.relative_drop_threshold {
                flagged_dates.insert(day.date);
                problems.push(ProblemDay {
                    date: day.date,
                    sales: day.total_sales(),
                    deviation,
                    deviation_type: DeviationType::RelativeDrop,
                    severity: Severity::from_deviation(deviation),
                });
            }
        }

        // Policy 2: absolute low against the whole-range median.
        let median = median_sales(series);
        if median > 0.0 {
            let floor = median * self.config.absolute_low_ratio;
            for day in series {
                if day.total_sales() < floor && !flagged_dates.contains(&day.date) {
                    let deviation = (median - day.total_sales()) / median;
                    problems.push(ProblemDay {
                        date: day.date,
                        sales: day.total_sales(),
                        deviation,
                        deviation_type: DeviationType::AbsoluteLow,
                        severity: Severity::from_deviation(deviation),
                    });
                }
            }
        }

        if !self.config.include_minor {
            problems.retain(|p| p.severity != Severity::Minor);
        }

        problems.sort_by(|a, b| {
            b.deviation
                .partial_cmp(&a.deviation)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.date.cmp(&b.date))
        });
        problems
    }
}

fn median_sales(series: &[DailyMetrics]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mut sales: Vec<f64> = series.iter().map(|d| d.total_sales()).collect();
    sales.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sales.len() / 2;
    if sales.len() % 2 == 0 {
        (sales[mid - 1] + sales[mid]) / 2.0
    } else {
        sales[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::daily_metrics::{FakeOrderAdjustment, RawPlatformRecord};
    use crate::domain::values::baseline::estimate_series;
    use chrono::NaiveDate;

    fn day(date: &str, sales: f64) -> DailyMetrics {
        DailyMetrics::fuse(
            1,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            Some(RawPlatformRecord {
                sales,
                orders: 10,
                ..Default::default()
            }),
            None,
            FakeOrderAdjustment::default(),
        )
        .unwrap()
    }

    fn steady_then_crash() -> Vec<DailyMetrics> {
        let mut series: Vec<_> = (1..=14)
            .map(|d| day(&format!("2025-03-{d:02}"), 1_000_000.0))
            .collect();
        series.push(day("2025-03-15", 300_000.0));
        series
    }

    #[test]
    fn test_relative_drop_flagged() {
        let series = steady_then_crash();
        let baselines = estimate_series(&series);
        let detector = AnomalyDetector::new(DetectorConfig::default());
        let problems = detector.detect(&series, &baselines);

        assert_eq!(problems.len(), 1);
        let p = &problems[0];
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(p.deviation_type, DeviationType::RelativeDrop);
        assert!((p.deviation - 0.7).abs() < 1e-9);
        assert_eq!(p.severity, Severity::Critical);
    }

    #[test]
    fn test_absolute_low_catches_chronic_underperformer() {
        // Sales decline so slowly the 7-day baseline keeps up, but several
        // days sit far below the range median.
        let mut series = Vec::new();
        for d in 1..=20 {
            series.push(day(&format!("2025-03-{d:02}"), 1_000_000.0));
        }
        // Slow glide down, under 5% per day vs trailing average.
        let glide = [
            960_000.0, 930_000.0, 900_000.0, 870_000.0, 840_000.0, 810_000.0, 780_000.0,
            750_000.0, 720_000.0, 690_000.0,
        ];
        for (i, s) in glide.iter().enumerate() {
            series.push(day(&format!("2025-03-{:02}", 21 + i), *s));
        }
        let baselines = estimate_series(&series);
        let detector = AnomalyDetector::new(DetectorConfig::default());
        let problems = detector.detect(&series, &baselines);

        assert!(!problems.is_empty());
        assert!(problems
            .iter()
            .all(|p| p.deviation_type == DeviationType::AbsoluteLow));
    }

    #[test]
    fn test_idempotent_and_deterministically_ordered() {
        let series = steady_then_crash();
        let baselines = estimate_series(&series);
        let detector = AnomalyDetector::new(DetectorConfig::default());

        let first = detector.detect(&series, &baselines);
        let second = detector.detect(&series, &baselines);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.deviation, b.deviation);
        }
    }

    #[test]
    fn test_no_duplicate_dates_across_policies() {
        let series = steady_then_crash();
        let baselines = estimate_series(&series);
        let detector = AnomalyDetector::new(DetectorConfig {
            include_minor: true,
            ..Default::default()
        });
        let problems = detector.detect(&series, &baselines);

        let mut dates: Vec<_> = problems.iter().map(|p| p.date).collect();
        let before = dates.len();
        dates.sort();
        dates.dedup();
        assert_eq!(before, dates.len());
    }

    #[test]
    fn test_flat_series_yields_nothing() {
        let series: Vec<_> = (1..=20)
            .map(|d| day(&format!("2025-03-{d:02}"), 1_000_000.0))
            .collect();
        let baselines = estimate_series(&series);
        let detector = AnomalyDetector::new(DetectorConfig::default());
        assert!(detector.detect(&series, &baselines).is_empty());
    }

    #[test]
    fn test_minor_days_hidden_by_default() {
        let mut series: Vec<_> = (1..=10)
            .map(|d| day(&format!("2025-03-{d:02}"), 1_000_000.0))
            .collect();
        // 22% drop: flagged, Moderate. 16% drop: below relative threshold.
        series.push(day("2025-03-11", 780_000.0));
        let baselines = estimate_series(&series);

        let default_detector = AnomalyDetector::new(DetectorConfig::default());
        let problems = default_detector.detect(&series, &baselines);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].severity, Severity::Moderate);
    }
}
