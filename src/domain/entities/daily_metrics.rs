//! Canonical per-restaurant-day record fused from the two platform feeds.
//!
//! Each marketplace reports its own daily row; fusion merges them into one
//! immutable [`DailyMetrics`] value, netting out orders flagged as fake by
//! the out-of-band detection service. A correction produces a new record,
//! never an in-place mutation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Grab,
    Gojek,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Grab => write!(f, "Grab"),
            Platform::Gojek => write!(f, "Gojek"),
        }
    }
}

/// One raw daily row as delivered by a platform feed. Time-like fields are
/// already normalized to minutes at the repository boundary (the feeds ship
/// a mix of `H:MM:SS` strings and JSON-wrapped second counts).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlatformRecord {
    pub sales: f64,
    pub orders: i64,
    pub cancelled_orders: i64,
    pub lost_orders: i64,
    /// Store rating on the platform, when the feed reported one.
    pub rating: Option<f64>,
    pub ads_spend: f64,
    pub ads_sales: f64,
    pub impressions: i64,
    /// Minutes the store was offline/closed on the platform that day.
    pub offline_minutes: f64,
    pub preparation_minutes: f64,
    pub delivery_minutes: f64,
    pub driver_waiting_minutes: f64,
    pub out_of_stock: bool,
    pub busy: bool,
}

/// Per-platform slice of a fused day. Zero-filled when the raw row was absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub sales: f64,
    pub orders: i64,
    pub cancelled_orders: i64,
    pub lost_orders: i64,
    pub rating: Option<f64>,
    pub ads_spend: f64,
    pub ads_sales: f64,
    pub impressions: i64,
    pub offline_minutes: f64,
    pub preparation_minutes: f64,
    pub delivery_minutes: f64,
    pub driver_waiting_minutes: f64,
    pub out_of_stock: bool,
    pub busy: bool,
    /// True when the platform delivered a row for this date at all.
    pub reported: bool,
}

impl PlatformMetrics {
    fn from_raw(raw: RawPlatformRecord) -> Self {
        Self {
            sales: raw.sales,
            orders: raw.orders,
            cancelled_orders: raw.cancelled_orders,
            lost_orders: raw.lost_orders,
            rating: raw.rating,
            ads_spend: raw.ads_spend,
            ads_sales: raw.ads_sales,
            impressions: raw.impressions,
            offline_minutes: raw.offline_minutes,
            preparation_minutes: raw.preparation_minutes,
            delivery_minutes: raw.delivery_minutes,
            driver_waiting_minutes: raw.driver_waiting_minutes,
            out_of_stock: raw.out_of_stock,
            busy: raw.busy,
            reported: true,
        }
    }

    /// Ad-attributed sales per unit of spend. Zero when no spend.
    pub fn roas(&self) -> f64 {
        if self.ads_spend > 0.0 {
            self.ads_sales / self.ads_spend
        } else {
            0.0
        }
    }
}

/// Fake orders identified for one platform-day by the out-of-band detector.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FakeOrderRemoval {
    pub quantity: i64,
    pub amount: f64,
}

/// Per-day fake-order adjustment across both platforms.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FakeOrderAdjustment {
    pub grab: FakeOrderRemoval,
    pub gojek: FakeOrderRemoval,
}

/// One fused restaurant-day. Immutable value object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub restaurant_id: i64,
    pub date: NaiveDate,
    pub grab: PlatformMetrics,
    pub gojek: PlatformMetrics,
    pub fake_orders: FakeOrderAdjustment,
}

impl DailyMetrics {
    /// Fuse the two raw platform rows (either may be absent) into one record,
    /// net of fake-order adjustment.
    ///
    /// Returns `None` when both rows are absent: a date with no data is
    /// excluded from analysis, never represented as a zero-sales day.
    pub fn fuse(
        restaurant_id: i64,
        date: NaiveDate,
        grab: Option<RawPlatformRecord>,
        gojek: Option<RawPlatformRecord>,
        fake_orders: FakeOrderAdjustment,
    ) -> Option<Self> {
        if grab.is_none() && gojek.is_none() {
            return None;
        }
        Some(Self {
            restaurant_id,
            date,
            grab: grab.map(PlatformMetrics::from_raw).unwrap_or_default(),
            gojek: gojek.map(PlatformMetrics::from_raw).unwrap_or_default(),
            fake_orders,
        })
    }

    /// Platform sales net of that platform's fake-order amount, floored at 0.
    pub fn net_sales(&self, platform: Platform) -> f64 {
        let (metrics, removal) = match platform {
            Platform::Grab => (&self.grab, &self.fake_orders.grab),
            Platform::Gojek => (&self.gojek, &self.fake_orders.gojek),
        };
        (metrics.sales - removal.amount).max(0.0)
    }

    /// Total sales across platforms, net of fake orders. Never negative.
    pub fn total_sales(&self) -> f64 {
        self.net_sales(Platform::Grab) + self.net_sales(Platform::Gojek)
    }

    /// Total orders net of cancelled, lost and fake orders. Never negative.
    pub fn total_orders(&self) -> i64 {
        let gross = self.grab.orders + self.gojek.orders;
        let removed = self.grab.cancelled_orders
            + self.grab.lost_orders
            + self.gojek.cancelled_orders
            + self.gojek.lost_orders
            + self.fake_orders.grab.quantity
            + self.fake_orders.gojek.quantity;
        (gross - removed).max(0)
    }

    pub fn platform(&self, platform: Platform) -> &PlatformMetrics {
        match platform {
            Platform::Grab => &self.grab,
            Platform::Gojek => &self.gojek,
        }
    }

    pub fn total_ad_spend(&self) -> f64 {
        self.grab.ads_spend + self.gojek.ads_spend
    }
}
