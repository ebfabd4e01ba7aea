//! Static Indonesian/Balinese holiday calendar.
//!
//! Dates are maintained by hand per year; the lunar-calendar holidays move
//! and there is no reliable free API for the Balinese ceremonial days that
//! actually matter here. Nyepi dominates everything: delivery platforms are
//! legally shut for the whole day.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::ports::holidays::{HolidayCategory, HolidayInfo, HolidayLookup};

pub struct HolidayCalendar {
    entries: HashMap<NaiveDate, HolidayInfo>,
}

impl HolidayCalendar {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_entries(entries: Vec<(NaiveDate, HolidayInfo)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Calendar covering 2024-2025 for the Bali fleet.
    pub fn indonesian_defaults() -> Self {
        let mut entries = HashMap::new();
        let mut add = |y: i32, m: u32, d: u32, name: &str, category, impact: f64| {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                entries.insert(
                    date,
                    HolidayInfo {
                        name: name.to_string(),
                        category,
                        expected_impact_pct: impact,
                    },
                );
            }
        };

        for y in [2024, 2025] {
            add(y, 1, 1, "New Year's Day", HolidayCategory::National, 10.0);
            add(y, 8, 17, "Independence Day", HolidayCategory::National, 5.0);
            add(y, 12, 25, "Christmas Day", HolidayCategory::Religious, 15.0);
            add(y, 12, 31, "New Year's Eve", HolidayCategory::Observance, 20.0);
        }

        // Nyepi, the Balinese day of silence. Everything closes, couriers
        // included; sales go to effectively zero.
        add(2024, 3, 11, "Nyepi", HolidayCategory::Balinese, -95.0);
        add(2025, 3, 29, "Nyepi", HolidayCategory::Balinese, -95.0);

        // Eid: the first day empties the cities as people travel home, the
        // second day orders pick back up among those who stayed.
        add(2024, 4, 10, "Idul Fitri (day 1)", HolidayCategory::Religious, -40.0);
        add(2024, 4, 11, "Idul Fitri (day 2)", HolidayCategory::Religious, -20.0);
        add(2025, 3, 31, "Idul Fitri (day 1)", HolidayCategory::Religious, -40.0);
        add(2025, 4, 1, "Idul Fitri (day 2)", HolidayCategory::Religious, -20.0);

        // Galungan/Kuningan: ceremony days, families cook at home.
        add(2024, 2, 28, "Galungan", HolidayCategory::Balinese, -25.0);
        add(2024, 3, 9, "Kuningan", HolidayCategory::Balinese, -15.0);
        add(2024, 9, 25, "Galungan", HolidayCategory::Balinese, -25.0);
        add(2024, 10, 5, "Kuningan", HolidayCategory::Balinese, -15.0);
        add(2025, 4, 23, "Galungan", HolidayCategory::Balinese, -25.0);
        add(2025, 5, 3, "Kuningan", HolidayCategory::Balinese, -15.0);

        Self { entries }
    }
}

impl HolidayLookup for HolidayCalendar {
    fn holiday(&self, date: NaiveDate) -> Result<Option<HolidayInfo>, DomainError> {
        Ok(self.entries.get(&date).cloned())
    }
}
