pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::application::analyze::{AnalysisReport, AnalyzeConfig, AnalyzeUseCase, BatchOutcome};
use crate::application::detect::{AnomalyDetector, DetectorConfig};
use crate::application::explain::{ExplainConfig, ExplainabilityEngine};
use crate::application::features::FeatureBuilder;
use crate::application::fusion::FusionUseCase;
use crate::application::rules::{RuleAttributionEngine, RuleConfig};
use crate::application::train::{TrainConfig, TrainReport, TrainUseCase};
use crate::domain::entities::attribution::ProblemDay;
use crate::domain::error::DomainError;
use crate::domain::ports::fake_orders::FakeOrderLookup;
use crate::domain::ports::holidays::HolidayLookup;
use crate::domain::ports::metrics_repository::{MetricsRepository, Restaurant};
use crate::domain::ports::model_store::ModelStore;
use crate::domain::ports::tourism::TourismIndexLookup;
use crate::domain::ports::weather::WeatherLookup;
use crate::domain::values::baseline::estimate_series;
use crate::infrastructure::lookups::holiday_calendar::HolidayCalendar;
use crate::infrastructure::lookups::open_meteo::OpenMeteoClient;
use crate::infrastructure::lookups::static_weather::StaticWeather;
use crate::infrastructure::lookups::tourism_season::BaliSeasonIndex;
use crate::infrastructure::model_store::json_store::JsonModelStore;
use crate::infrastructure::sqlite::metrics_repo::SqliteMetricsRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;

pub struct SaleScope {
    metrics_repo: Arc<dyn MetricsRepository>,
    fusion_uc: FusionUseCase,
    detector: AnomalyDetector,
    train_uc: TrainUseCase,
    analyze_uc: AnalyzeUseCase,
}

impl SaleScope {
    /// Wire from the environment: `SALESCOPE_WEATHER_PROVIDER` (`open-meteo`
    /// or `none`) and `SALESCOPE_HOLIDAYS` (`indonesia` or `none`).
    pub fn new(db_path: &str, model_path: &str) -> Result<Self, DomainError> {
        let weather_provider =
            std::env::var("SALESCOPE_WEATHER_PROVIDER").unwrap_or_else(|_| "open-meteo".into());
        let weather: Arc<dyn WeatherLookup> = match weather_provider.as_str() {
            "none" => Arc::new(StaticWeather),
            _ => Arc::new(OpenMeteoClient::new()),
        };

        let holiday_source =
            std::env::var("SALESCOPE_HOLIDAYS").unwrap_or_else(|_| "indonesia".into());
        let holidays: Arc<dyn HolidayLookup> = match holiday_source.as_str() {
            "none" => Arc::new(HolidayCalendar::empty()),
            _ => Arc::new(HolidayCalendar::indonesian_defaults()),
        };

        Self::with_providers(
            db_path,
            Arc::new(JsonModelStore::new(model_path)),
            weather,
            holidays,
            Arc::new(BaliSeasonIndex),
        )
    }

    pub fn with_providers(
        db_path: &str,
        model_store: Arc<dyn ModelStore>,
        weather: Arc<dyn WeatherLookup>,
        holidays: Arc<dyn HolidayLookup>,
        tourism: Arc<dyn TourismIndexLookup>,
    ) -> Result<Self, DomainError> {
        let conn =
            Connection::open(db_path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;

        let repo = Arc::new(SqliteMetricsRepo::new(conn));
        let metrics_repo: Arc<dyn MetricsRepository> = repo.clone();
        let fake_orders: Arc<dyn FakeOrderLookup> = repo;

        // A persisted model whose manifest disagrees with the current feature
        // contract is unusable and the mismatch is fatal; absence of a model
        // is not, analysis just degrades to rules only.
        let model = model_store.load()?;
        if let Some(model) = &model {
            model.validate_manifest()?;
        }

        let detector = AnomalyDetector::new(DetectorConfig::default());

        let train_uc = TrainUseCase::new(
            metrics_repo.clone(),
            FusionUseCase::new(metrics_repo.clone(), fake_orders.clone()),
            FeatureBuilder::new(weather.clone(), holidays.clone(), tourism.clone()),
            model_store,
            TrainConfig::default(),
        );

        let analyze_uc = AnalyzeUseCase::new(
            metrics_repo.clone(),
            FusionUseCase::new(metrics_repo.clone(), fake_orders.clone()),
            AnomalyDetector::new(DetectorConfig::default()),
            RuleAttributionEngine::new(RuleConfig::default()),
            FeatureBuilder::new(weather.clone(), holidays.clone(), tourism),
            ExplainabilityEngine::new(ExplainConfig::default()),
            weather,
            holidays,
            model,
            AnalyzeConfig::default(),
        );

        Ok(Self {
            metrics_repo: metrics_repo.clone(),
            fusion_uc: FusionUseCase::new(metrics_repo, fake_orders),
            detector,
            train_uc,
            analyze_uc,
        })
    }

    // Delegating methods

    pub fn restaurants(&self) -> Result<Vec<Restaurant>, DomainError> {
        self.metrics_repo.restaurants()
    }

    /// Flag problem days without attributing causes.
    pub fn detect(
        &self,
        restaurant_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProblemDay>, DomainError> {
        let series = self.fusion_uc.series(restaurant_id, start, end)?;
        let baselines = estimate_series(&series);
        Ok(self.detector.detect(&series, &baselines))
    }

    pub async fn analyze(
        &self,
        restaurant_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AnalysisReport, DomainError> {
        self.analyze_uc.execute(restaurant_id, start, end).await
    }

    pub async fn analyze_batch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BatchOutcome, DomainError> {
        self.analyze_uc.execute_batch(start, end).await
    }

    /// Train the global model and persist it. A freshly trained model is
    /// picked up on the next construction, not by the running instance.
    pub async fn train(&self, start: NaiveDate, end: NaiveDate) -> Result<TrainReport, DomainError> {
        self.train_uc.execute(start, end).await
    }
}
