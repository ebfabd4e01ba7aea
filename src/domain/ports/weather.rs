use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// One day's weather at a restaurant's location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub precipitation_mm: f64,
    pub temperature_c: f64,
    pub wind_speed_kmh: f64,
}

impl WeatherObservation {
    /// Documented fallback when the weather provider is unreachable:
    /// a dry tropical day (0 mm, 27 °C, light wind). Analyses degrade to
    /// this instead of aborting.
    pub fn fallback() -> Self {
        Self {
            precipitation_mm: 0.0,
            temperature_c: 27.0,
            wind_speed_kmh: 5.0,
        }
    }
}

/// Historical weather lookup. Implementations must cache by (location, date);
/// the archive never changes for a past day.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn observe(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<WeatherObservation, DomainError>;
}
