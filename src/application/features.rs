//! Builds the fixed-schema feature vector for one restaurant-day.
//!
//! Trend features come from the baseline estimator and therefore only see
//! data strictly before the target date; everything else is observable on
//! the day itself. External lookups degrade to their documented defaults
//! instead of failing the build.

use std::sync::Arc;

use chrono::Datelike;

use crate::domain::entities::daily_metrics::DailyMetrics;
use crate::domain::error::DomainError;
use crate::domain::ports::holidays::HolidayLookup;
use crate::domain::ports::tourism::TourismIndexLookup;
use crate::domain::ports::weather::{WeatherLookup, WeatherObservation};
use crate::domain::values::baseline::Baseline;
use crate::domain::values::features::{FeatureVector, FEATURE_COUNT};

pub struct FeatureBuilder {
    weather: Arc<dyn WeatherLookup>,
    holidays: Arc<dyn HolidayLookup>,
    tourism: Arc<dyn TourismIndexLookup>,
}

impl FeatureBuilder {
    pub fn new(
        weather: Arc<dyn WeatherLookup>,
        holidays: Arc<dyn HolidayLookup>,
        tourism: Arc<dyn TourismIndexLookup>,
    ) -> Self {
        Self {
            weather,
            holidays,
            tourism,
        }
    }

    /// Build the feature vector for one fused day.
    ///
    /// Missing ratings become 0.0 and missing trend baselines fall back to
    /// the day's own sales level (gradient to 0.0) — inference-time degrade
    /// for thin history; training skips such rows entirely.
    pub async fn build(
        &self,
        day: &DailyMetrics,
        baseline: &Baseline,
        location: &str,
    ) -> Result<FeatureVector, DomainError> {
        let weather = match self.weather.observe(location, day.date).await {
            Ok(w) => w,
            Err(e) => {
                eprintln!(
                    "WARNING: weather lookup failed for {location} on {}: {e}; using fallback",
                    day.date
                );
                WeatherObservation::fallback()
            }
        };
        let holiday = self.holidays.holiday(day.date).unwrap_or_else(|e| {
            eprintln!("WARNING: holiday lookup failed for {}: {e}", day.date);
            None
        });
        let tourism = self.tourism.index(day.date).unwrap_or_else(|e| {
            eprintln!("WARNING: tourism lookup failed for {}: {e}", day.date);
            0.5
        });

        let weekday = day.date.weekday();
        let total_sales = day.total_sales();

        let mut values = Vec::with_capacity(FEATURE_COUNT);
        // Operational
        values.push(day.grab.offline_minutes);
        values.push(day.gojek.offline_minutes);
        values.push(day.grab.driver_waiting_minutes);
        values.push(day.gojek.driver_waiting_minutes);
        values.push(day.grab.preparation_minutes.max(day.gojek.preparation_minutes));
        values.push(day.grab.delivery_minutes.max(day.gojek.delivery_minutes));
        // Marketing
        values.push(day.grab.roas());
        values.push(day.gojek.roas());
        values.push(day.total_ad_spend());
        values.push((day.grab.impressions + day.gojek.impressions) as f64);
        // Quality
        values.push(day.grab.rating.unwrap_or(0.0));
        values.push(day.gojek.rating.unwrap_or(0.0));
        // Calendar
        values.push(weekday.num_days_from_monday() as f64);
        values.push(if weekday.num_days_from_monday() >= 5 { 1.0 } else { 0.0 });
        values.push(if holiday.is_some() { 1.0 } else { 0.0 });
        // External
        values.push(weather.precipitation_mm);
        values.push(weather.temperature_c);
        values.push(tourism.clamp(0.0, 1.0));
        // Trend
        values.push(baseline.rolling_7d_avg.unwrap_or(total_sales));
        values.push(baseline.rolling_30d_avg.unwrap_or(total_sales));
        values.push(baseline.gradient_7d.unwrap_or(0.0));

        FeatureVector::new(day.restaurant_id, day.date, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::daily_metrics::{FakeOrderAdjustment, RawPlatformRecord};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FixedWeather(WeatherObservation);

    #[async_trait]
    impl WeatherLookup for FixedWeather {
        async fn observe(
            &self,
            _location: &str,
            _date: NaiveDate,
        ) -> Result<WeatherObservation, DomainError> {
            Ok(self.0)
        }
    }

    struct FailingWeather;

    #[async_trait]
    impl WeatherLookup for FailingWeather {
        async fn observe(
            &self,
            _location: &str,
            _date: NaiveDate,
        ) -> Result<WeatherObservation, DomainError> {
            Err(DomainError::ExternalLookup("provider down".into()))
        }
    }

    struct NoHolidays;
    impl HolidayLookup for NoHolidays {
        fn holiday(
            &self,
            _date: NaiveDate,
        ) -> Result<Option<crate::domain::ports::holidays::HolidayInfo>, DomainError> {
            Ok(None)
        }
    }

    struct MidSeason;
    impl TourismIndexLookup for MidSeason {
        fn index(&self, _date: NaiveDate) -> Result<f64, DomainError> {
            Ok(0.5)
        }
    }

    fn sample_day() -> DailyMetrics {
        DailyMetrics::fuse(
            7,
            NaiveDate::from_ymd_opt(2025, 4, 19).unwrap(), // Saturday
            Some(RawPlatformRecord {
                sales: 900_000.0,
                orders: 25,
                rating: Some(4.6),
                ads_spend: 100_000.0,
                ads_sales: 250_000.0,
                impressions: 4_000,
                ..Default::default()
            }),
            Some(RawPlatformRecord {
                sales: 600_000.0,
                orders: 18,
                rating: None,
                ..Default::default()
            }),
            FakeOrderAdjustment::default(),
        )
        .unwrap()
    }

    fn sample_baseline() -> Baseline {
        Baseline {
            restaurant_id: 7,
            as_of_date: NaiveDate::from_ymd_opt(2025, 4, 19).unwrap(),
            rolling_7d_avg: Some(1_400_000.0),
            rolling_30d_avg: Some(1_350_000.0),
            gradient_7d: Some(-100_000.0),
            rolling_7d_ad_spend: Some(90_000.0),
        }
    }

    #[tokio::test]
    async fn test_feature_layout_matches_contract() {
        let builder = FeatureBuilder::new(
            Arc::new(FixedWeather(WeatherObservation {
                precipitation_mm: 3.0,
                temperature_c: 29.0,
                wind_speed_kmh: 4.0,
            })),
            Arc::new(NoHolidays),
            Arc::new(MidSeason),
        );
        let fv = builder
            .build(&sample_day(), &sample_baseline(), "denpasar")
            .await
            .unwrap();

        assert_eq!(fv.values.len(), FEATURE_COUNT);
        assert_eq!(fv.get("grab_roas"), Some(2.5));
        assert_eq!(fv.get("gojek_rating"), Some(0.0)); // missing -> 0.0
        assert_eq!(fv.get("day_of_week"), Some(5.0)); // Saturday
        assert_eq!(fv.get("is_weekend"), Some(1.0));
        assert_eq!(fv.get("precipitation_mm"), Some(3.0));
        assert_eq!(fv.get("sales_7d_avg"), Some(1_400_000.0));
        assert_eq!(fv.get("sales_gradient_7d"), Some(-100_000.0));
    }

    #[tokio::test]
    async fn test_weather_failure_degrades_to_fallback() {
        let builder = FeatureBuilder::new(
            Arc::new(FailingWeather),
            Arc::new(NoHolidays),
            Arc::new(MidSeason),
        );
        let fv = builder
            .build(&sample_day(), &sample_baseline(), "denpasar")
            .await
            .unwrap();

        assert_eq!(fv.get("precipitation_mm"), Some(0.0));
        assert_eq!(fv.get("temperature_c"), Some(27.0));
    }

    #[tokio::test]
    async fn test_thin_history_falls_back_to_same_day_level() {
        let builder = FeatureBuilder::new(
            Arc::new(FixedWeather(WeatherObservation::fallback())),
            Arc::new(NoHolidays),
            Arc::new(MidSeason),
        );
        let day = sample_day();
        let baseline = Baseline {
            restaurant_id: 7,
            as_of_date: day.date,
            rolling_7d_avg: None,
            rolling_30d_avg: None,
            gradient_7d: None,
            rolling_7d_ad_spend: None,
        };
        let fv = builder.build(&day, &baseline, "denpasar").await.unwrap();
        assert_eq!(fv.get("sales_7d_avg"), Some(day.total_sales()));
        assert_eq!(fv.get("sales_gradient_7d"), Some(0.0));
    }
}
