//! Shared test fixtures: a seedable sqlite file and an offline facade.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;
use salescope::domain::entities::daily_metrics::RawPlatformRecord;
use salescope::domain::ports::metrics_repository::Restaurant;
use salescope::infrastructure::lookups::holiday_calendar::HolidayCalendar;
use salescope::infrastructure::lookups::static_weather::StaticWeather;
use salescope::infrastructure::lookups::tourism_season::BaliSeasonIndex;
use salescope::infrastructure::model_store::json_store::JsonModelStore;
use salescope::infrastructure::sqlite::metrics_repo::SqliteMetricsRepo;
use salescope::infrastructure::sqlite::migrations::run_migrations;
use salescope::SaleScope;

pub fn seed_repo(db_path: &Path) -> SqliteMetricsRepo {
    let conn = Connection::open(db_path).unwrap();
    run_migrations(&conn).unwrap();
    SqliteMetricsRepo::new(conn)
}

pub fn add_restaurant(repo: &SqliteMetricsRepo, id: i64, name: &str) {
    repo.insert_restaurant(&Restaurant {
        id,
        name: name.into(),
        location: "denpasar".into(),
    })
    .unwrap();
}

/// A normal day's platform row: decent rating, no ads, no downtime.
pub fn healthy(sales: f64) -> RawPlatformRecord {
    RawPlatformRecord {
        sales,
        orders: (sales / 40_000.0).max(1.0) as i64,
        rating: Some(4.8),
        ..Default::default()
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Facade wired for offline tests: static weather, no holidays.
pub fn scope(db_path: &Path, model_path: &Path) -> SaleScope {
    SaleScope::with_providers(
        db_path.to_str().unwrap(),
        Arc::new(JsonModelStore::new(model_path)),
        Arc::new(StaticWeather),
        Arc::new(HolidayCalendar::empty()),
        Arc::new(BaliSeasonIndex),
    )
    .unwrap()
}
