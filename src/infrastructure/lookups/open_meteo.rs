//! Historical weather via the Open-Meteo archive API.
//!
//! Past weather never changes, so every successful lookup is cached for the
//! process lifetime. Failures surface as `ExternalLookup`; callers decide
//! whether to degrade to [`WeatherObservation::fallback`].

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::ports::weather::{WeatherLookup, WeatherObservation};

pub struct OpenMeteoClient {
    client: reqwest::Client,
    cache: Mutex<HashMap<(String, NaiveDate), WeatherObservation>>,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Coordinates for the location keys used in the restaurants table.
    /// Unknown keys resolve to Denpasar; the fleet is Bali-based.
    fn coordinates(location: &str) -> (f64, f64) {
        match location.to_ascii_lowercase().as_str() {
            "ubud" => (-8.5069, 115.2625),
            "canggu" => (-8.6478, 115.1385),
            "seminyak" => (-8.6913, 115.1571),
            "uluwatu" => (-8.8291, 115.0849),
            _ => (-8.6705, 115.2126), // denpasar
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ArchiveResponse {
    daily: DailyBlock,
}

#[derive(Debug, serde::Deserialize)]
struct DailyBlock {
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
}

#[async_trait]
impl WeatherLookup for OpenMeteoClient {
    async fn observe(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<WeatherObservation, DomainError> {
        let key = (location.to_string(), date);
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return Ok(*hit);
            }
        }

        let (lat, lon) = Self::coordinates(location);
        let day = date.format("%Y-%m-%d").to_string();
        let url = format!(
            "https://archive-api.open-meteo.com/v1/archive?latitude={lat}&longitude={lon}\
             &start_date={day}&end_date={day}\
             &daily=precipitation_sum,temperature_2m_mean,wind_speed_10m_max\
             &timezone=Asia%2FMakassar"
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::ExternalLookup(format!("open-meteo request: {e}")))?;
        if !resp.status().is_success() {
            return Err(DomainError::ExternalLookup(format!(
                "open-meteo returned {}",
                resp.status()
            )));
        }
        let data: ArchiveResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("open-meteo response: {e}")))?;

        let fallback = WeatherObservation::fallback();
        let observation = WeatherObservation {
            precipitation_mm: data
                .daily
                .precipitation_sum
                .first()
                .copied()
                .flatten()
                .unwrap_or(fallback.precipitation_mm),
            temperature_c: data
                .daily
                .temperature_2m_mean
                .first()
                .copied()
                .flatten()
                .unwrap_or(fallback.temperature_c),
            wind_speed_kmh: data
                .daily
                .wind_speed_10m_max
                .first()
                .copied()
                .flatten()
                .unwrap_or(fallback.wind_speed_kmh),
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, observation);
        }
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_locations_have_distinct_coordinates() {
        assert_ne!(
            OpenMeteoClient::coordinates("ubud"),
            OpenMeteoClient::coordinates("canggu")
        );
    }

    #[test]
    fn test_unknown_location_falls_back_to_denpasar() {
        assert_eq!(
            OpenMeteoClient::coordinates("somewhere-new"),
            OpenMeteoClient::coordinates("denpasar")
        );
    }
}
