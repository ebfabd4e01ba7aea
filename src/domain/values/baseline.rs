//! Per-restaurant rolling sales baselines.
//!
//! Every window is strictly backward-looking: the baseline for date `t` uses
//! only observations dated before `t`. Same-day and future leakage here would
//! silently corrupt both the anomaly thresholds and the model's trend
//! features, so the window arithmetic is the one invariant this module
//! defends above all else.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::entities::daily_metrics::DailyMetrics;

/// Rolling statistics for one restaurant as of one date. Derived on demand,
/// never persisted. `None` fields mean there was no prior history at all
/// (degrade, not an error).
#[derive(Debug, Clone, Serialize)]
pub struct Baseline {
    pub restaurant_id: i64,
    pub as_of_date: NaiveDate,
    /// Mean sales over observations in [t-7d, t).
    pub rolling_7d_avg: Option<f64>,
    /// Mean sales over observations in [t-30d, t).
    pub rolling_30d_avg: Option<f64>,
    /// sales[t] - sales[t-7d], when a record exists exactly 7 days earlier.
    pub gradient_7d: Option<f64>,
    /// Mean ad spend over [t-7d, t); feeds the "ads disabled" check.
    pub rolling_7d_ad_spend: Option<f64>,
}

/// Compute a baseline for each entry of a date-sorted series.
///
/// With fewer than 7/30 prior observations the windows use whatever is
/// available (minimum one); with none at all the fields are `None`.
pub fn estimate_series(series: &[DailyMetrics]) -> Vec<Baseline> {
    debug_assert!(
        series.windows(2).all(|w| w[0].date < w[1].date),
        "series must be sorted by date without duplicates"
    );

    let mut baselines = Vec::with_capacity(series.len());
    for (i, day) in series.iter().enumerate() {
        let from_7 = day.date - Duration::days(7);
        let from_30 = day.date - Duration::days(30);

        let mut sum_7 = 0.0;
        let mut n_7 = 0usize;
        let mut sum_30 = 0.0;
        let mut n_30 = 0usize;
        let mut spend_7 = 0.0;

        // Only entries strictly before the target date enter the windows.
        for prior in series[..i].iter().rev() {
            if prior.date < from_30 {
                break;
            }
            let sales = prior.total_sales();
            if prior.date >= from_7 {
                sum_7 += sales;
                spend_7 += prior.total_ad_spend();
                n_7 += 1;
            }
            sum_30 += sales;
            n_30 += 1;
        }

        let gradient_7d = series[..i]
            .binary_search_by_key(&from_7, |m| m.date)
            .ok()
            .map(|j| day.total_sales() - series[j].total_sales());

        baselines.push(Baseline {
            restaurant_id: day.restaurant_id,
            as_of_date: day.date,
            rolling_7d_avg: (n_7 > 0).then(|| sum_7 / n_7 as f64),
            rolling_30d_avg: (n_30 > 0).then(|| sum_30 / n_30 as f64),
            gradient_7d,
            rolling_7d_ad_spend: (n_7 > 0).then(|| spend_7 / n_7 as f64),
        });
    }
    baselines
}
