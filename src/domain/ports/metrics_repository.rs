use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::entities::daily_metrics::RawPlatformRecord;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Serialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// Location key used for weather lookups (e.g. "denpasar").
    pub location: String,
}

/// One date's raw rows from both platform feeds. Either side may be absent.
#[derive(Debug, Clone)]
pub struct RawDay {
    pub date: NaiveDate,
    pub grab: Option<RawPlatformRecord>,
    pub gojek: Option<RawPlatformRecord>,
}

/// Read access to the ingested per-platform daily statistics.
pub trait MetricsRepository: Send + Sync {
    fn restaurant(&self, id: i64) -> Result<Restaurant, DomainError>;

    fn restaurants(&self) -> Result<Vec<Restaurant>, DomainError>;

    /// Raw rows for a restaurant over an inclusive date range, sorted by
    /// date. Dates where neither platform reported are not returned.
    fn raw_days(
        &self,
        restaurant_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawDay>, DomainError>;
}
