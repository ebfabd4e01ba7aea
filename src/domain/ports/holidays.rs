use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayCategory {
    National,
    Religious,
    /// Balinese ceremonial days; Nyepi in particular shuts the island down.
    Balinese,
    Observance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayInfo {
    pub name: String,
    pub category: HolidayCategory,
    /// Expected sales impact in percent, signed. Negative on days couriers
    /// stay home, positive when people order in instead of going out.
    pub expected_impact_pct: f64,
}

pub trait HolidayLookup: Send + Sync {
    fn holiday(&self, date: NaiveDate) -> Result<Option<HolidayInfo>, DomainError>;
}
