//! Offline weather provider: every day is the documented dry-season default.
//! Used in air-gapped deployments and tests; weather factors simply never
//! fire.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::ports::weather::{WeatherLookup, WeatherObservation};

pub struct StaticWeather;

#[async_trait]
impl WeatherLookup for StaticWeather {
    async fn observe(
        &self,
        _location: &str,
        _date: NaiveDate,
    ) -> Result<WeatherObservation, DomainError> {
        Ok(WeatherObservation::fallback())
    }
}
