//! Sqlite-backed access to the ingested platform statistics.
//!
//! The two feed tables keep each platform's native quirks: grab reports
//! durations in seconds, gojek ships `H:MM:SS` clock strings. Normalization
//! to minutes happens here so the domain only ever sees minutes.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::domain::entities::daily_metrics::{
    FakeOrderAdjustment, FakeOrderRemoval, Platform, RawPlatformRecord,
};
use crate::domain::error::DomainError;
use crate::domain::ports::fake_orders::FakeOrderLookup;
use crate::domain::ports::metrics_repository::{MetricsRepository, RawDay, Restaurant};

pub struct SqliteMetricsRepo {
    conn: Mutex<Connection>,
}

impl SqliteMetricsRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_grab(row: &rusqlite::Row) -> Result<(NaiveDate, RawPlatformRecord), rusqlite::Error> {
        let date_str: String = row.get(0)?;
        let date = parse_date(&date_str)?;
        let driver_waiting_seconds: f64 = row.get(12)?;
        Ok((
            date,
            RawPlatformRecord {
                sales: row.get(1)?,
                orders: row.get(2)?,
                cancelled_orders: row.get(3)?,
                lost_orders: row.get(4)?,
                rating: row.get(5)?,
                ads_spend: row.get(6)?,
                ads_sales: row.get(7)?,
                impressions: row.get(8)?,
                offline_minutes: row.get(9)?,
                preparation_minutes: row.get(10)?,
                delivery_minutes: row.get(11)?,
                driver_waiting_minutes: driver_waiting_seconds / 60.0,
                out_of_stock: row.get(13)?,
                busy: row.get(14)?,
            },
        ))
    }

    fn row_to_gojek(row: &rusqlite::Row) -> Result<(NaiveDate, RawPlatformRecord), rusqlite::Error> {
        let date_str: String = row.get(0)?;
        let date = parse_date(&date_str)?;
        let close_time: Option<String> = row.get(9)?;
        let preparation_time: Option<String> = row.get(10)?;
        let delivery_time: Option<String> = row.get(11)?;
        let driver_waiting: Option<String> = row.get(12)?;
        Ok((
            date,
            RawPlatformRecord {
                sales: row.get(1)?,
                orders: row.get(2)?,
                cancelled_orders: row.get(3)?,
                lost_orders: row.get(4)?,
                rating: row.get(5)?,
                ads_spend: row.get(6)?,
                ads_sales: row.get(7)?,
                impressions: row.get(8)?,
                offline_minutes: clock_to_minutes(close_time.as_deref()),
                preparation_minutes: clock_to_minutes(preparation_time.as_deref()),
                delivery_minutes: clock_to_minutes(delivery_time.as_deref()),
                driver_waiting_minutes: clock_to_minutes(driver_waiting.as_deref()),
                out_of_stock: row.get(13)?,
                busy: row.get(14)?,
            },
        ))
    }

    // Seeding helpers, used by ingestion scripts and test fixtures.

    pub fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO restaurants (id, name, location) VALUES (?1, ?2, ?3)",
            params![restaurant.id, restaurant.name, restaurant.location],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert restaurant: {e}")))?;
        Ok(())
    }

    pub fn insert_grab_day(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
        record: &RawPlatformRecord,
    ) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO grab_stats (restaurant_id, date, sales, orders, cancelled_orders, lost_orders, rating, ads_spend, ads_sales, impressions, offline_minutes, preparation_minutes, delivery_minutes, driver_waiting_seconds, out_of_stock, busy)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                restaurant_id,
                date.format("%Y-%m-%d").to_string(),
                record.sales,
                record.orders,
                record.cancelled_orders,
                record.lost_orders,
                record.rating,
                record.ads_spend,
                record.ads_sales,
                record.impressions,
                record.offline_minutes,
                record.preparation_minutes,
                record.delivery_minutes,
                record.driver_waiting_minutes * 60.0,
                record.out_of_stock,
                record.busy,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert grab row: {e}")))?;
        Ok(())
    }

    pub fn insert_gojek_day(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
        record: &RawPlatformRecord,
    ) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO gojek_stats (restaurant_id, date, sales, orders, cancelled_orders, lost_orders, rating, ads_spend, ads_sales, impressions, close_time, preparation_time, delivery_time, driver_waiting, out_of_stock, busy)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                restaurant_id,
                date.format("%Y-%m-%d").to_string(),
                record.sales,
                record.orders,
                record.cancelled_orders,
                record.lost_orders,
                record.rating,
                record.ads_spend,
                record.ads_sales,
                record.impressions,
                minutes_to_clock(record.offline_minutes),
                minutes_to_clock(record.preparation_minutes),
                minutes_to_clock(record.delivery_minutes),
                minutes_to_clock(record.driver_waiting_minutes),
                record.out_of_stock,
                record.busy,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert gojek row: {e}")))?;
        Ok(())
    }

    pub fn insert_fake_orders(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
        platform: Platform,
        quantity: i64,
        amount: f64,
    ) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO fake_orders (restaurant_id, date, platform, quantity, amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                restaurant_id,
                date.format("%Y-%m-%d").to_string(),
                match platform {
                    Platform::Grab => "grab",
                    Platform::Gojek => "gojek",
                },
                quantity,
                amount,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to insert fake orders: {e}")))?;
        Ok(())
    }
}

impl MetricsRepository for SqliteMetricsRepo {
    fn restaurant(&self, id: i64) -> Result<Restaurant, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT id, name, location FROM restaurants WHERE id = ?1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                Ok(Restaurant {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    location: row.get(2)?,
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;
        match rows.next() {
            Some(Ok(r)) => Ok(r),
            Some(Err(e)) => Err(DomainError::Database(e.to_string())),
            None => Err(DomainError::DataNotFound(format!("restaurant {id}"))),
        }
    }

    fn restaurants(&self) -> Result<Vec<Restaurant>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT id, name, location FROM restaurants ORDER BY id")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let restaurants = stmt
            .query_map([], |row| {
                Ok(Restaurant {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    location: row.get(2)?,
                })
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(restaurants)
    }

    fn raw_days(
        &self,
        restaurant_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawDay>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let start_str = start.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();

        let mut days: BTreeMap<NaiveDate, RawDay> = BTreeMap::new();

        let mut stmt = conn
            .prepare(
                "SELECT date, sales, orders, cancelled_orders, lost_orders, rating, ads_spend, ads_sales, impressions, offline_minutes, preparation_minutes, delivery_minutes, driver_waiting_seconds, out_of_stock, busy
                 FROM grab_stats WHERE restaurant_id = ?1 AND date BETWEEN ?2 AND ?3",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let grab_rows = stmt
            .query_map(params![restaurant_id, start_str, end_str], Self::row_to_grab)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for row in grab_rows {
            let (date, record) = row.map_err(|e| DomainError::Database(e.to_string()))?;
            days.entry(date)
                .or_insert_with(|| RawDay {
                    date,
                    grab: None,
                    gojek: None,
                })
                .grab = Some(record);
        }

        let mut stmt = conn
            .prepare(
                "SELECT date, sales, orders, cancelled_orders, lost_orders, rating, ads_spend, ads_sales, impressions, close_time, preparation_time, delivery_time, driver_waiting, out_of_stock, busy
                 FROM gojek_stats WHERE restaurant_id = ?1 AND date BETWEEN ?2 AND ?3",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let gojek_rows = stmt
            .query_map(params![restaurant_id, start_str, end_str], Self::row_to_gojek)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        for row in gojek_rows {
            let (date, record) = row.map_err(|e| DomainError::Database(e.to_string()))?;
            days.entry(date)
                .or_insert_with(|| RawDay {
                    date,
                    grab: None,
                    gojek: None,
                })
                .gojek = Some(record);
        }

        Ok(days.into_values().collect())
    }
}

impl FakeOrderLookup for SqliteMetricsRepo {
    fn adjustment(
        &self,
        restaurant_id: i64,
        date: NaiveDate,
    ) -> Result<FakeOrderAdjustment, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT platform, SUM(quantity), SUM(amount) FROM fake_orders
                 WHERE restaurant_id = ?1 AND date = ?2 GROUP BY platform",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                params![restaurant_id, date.format("%Y-%m-%d").to_string()],
                |row| {
                    let platform: String = row.get(0)?;
                    let quantity: i64 = row.get(1)?;
                    let amount: f64 = row.get(2)?;
                    Ok((platform, quantity, amount))
                },
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut adjustment = FakeOrderAdjustment::default();
        for row in rows {
            let (platform, quantity, amount) =
                row.map_err(|e| DomainError::Database(e.to_string()))?;
            let removal = FakeOrderRemoval { quantity, amount };
            match platform.as_str() {
                "grab" => adjustment.grab = removal,
                "gojek" => adjustment.gojek = removal,
                other => {
                    eprintln!("WARNING: unknown platform '{other}' in fake_orders, ignoring");
                }
            }
        }
        Ok(adjustment)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("invalid date '{s}'").into(),
        )
    })
}

/// Parse a `H:MM:SS` (or `H:MM`) clock string into fractional minutes.
/// NULL, empty and malformed values degrade to 0.0 with a warning; a feed
/// glitch in one duration column must not lose the whole day.
fn clock_to_minutes(clock: Option<&str>) -> f64 {
    let Some(clock) = clock else {
        return 0.0;
    };
    let trimmed = clock.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let parts: Vec<&str> = trimmed.split(':').collect();
    let parsed: Option<Vec<f64>> = parts.iter().map(|p| p.parse::<f64>().ok()).collect();
    match parsed.as_deref() {
        Some([h, m, s]) => h * 60.0 + m + s / 60.0,
        Some([h, m]) => h * 60.0 + m,
        _ => {
            eprintln!("WARNING: unparseable duration '{trimmed}', treating as 0");
            0.0
        }
    }
}

fn minutes_to_clock(minutes: f64) -> String {
    let total_seconds = (minutes * 60.0).round().max(0.0) as i64;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{h}:{m:02}:{s:02}")
}
