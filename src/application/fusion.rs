//! Series fusion use case: raw platform rows + fake-order adjustments in,
//! sorted canonical [`DailyMetrics`] series out.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::entities::daily_metrics::DailyMetrics;
use crate::domain::error::DomainError;
use crate::domain::ports::fake_orders::FakeOrderLookup;
use crate::domain::ports::metrics_repository::MetricsRepository;

pub struct FusionUseCase {
    metrics_repo: Arc<dyn MetricsRepository>,
    fake_orders: Arc<dyn FakeOrderLookup>,
}

impl FusionUseCase {
    pub fn new(
        metrics_repo: Arc<dyn MetricsRepository>,
        fake_orders: Arc<dyn FakeOrderLookup>,
    ) -> Self {
        Self {
            metrics_repo,
            fake_orders,
        }
    }

    /// Build the fused series for a restaurant over an inclusive range.
    ///
    /// Dates without any platform row are excluded, not zero-filled. An
    /// entirely empty range is `DataNotFound`: the caller must not confuse
    /// "no records" with "sold nothing".
    pub fn series(
        &self,
        restaurant_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyMetrics>, DomainError> {
        if end < start {
            return Err(DomainError::InvalidInput(format!(
                "range end {end} precedes start {start}"
            )));
        }

        let raw_days = self.metrics_repo.raw_days(restaurant_id, start, end)?;

        let mut series = Vec::with_capacity(raw_days.len());
        for raw in raw_days {
            // A failed fake-order lookup for one day degrades to no
            // adjustment rather than aborting the series.
            let adjustment = match self.fake_orders.adjustment(restaurant_id, raw.date) {
                Ok(adj) => adj,
                Err(e) => {
                    eprintln!(
                        "WARNING: fake-order lookup failed for restaurant {restaurant_id} on {}: {e}",
                        raw.date
                    );
                    Default::default()
                }
            };
            if let Some(day) =
                DailyMetrics::fuse(restaurant_id, raw.date, raw.grab, raw.gojek, adjustment)
            {
                series.push(day);
            }
        }

        if series.is_empty() {
            return Err(DomainError::DataNotFound(format!(
                "restaurant {restaurant_id} has no platform rows between {start} and {end}"
            )));
        }
        Ok(series)
    }
}
