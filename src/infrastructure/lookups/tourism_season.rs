//! Bali tourism seasonality as a monthly index in [0, 1].
//!
//! A coarse static curve beats no signal: arrivals data lags months and the
//! within-month variation is small next to the wet/dry season swing. July,
//! August and the year-end weeks are peak; the February wet season is the
//! trough.

use chrono::{Datelike, NaiveDate};

use crate::domain::error::DomainError;
use crate::domain::ports::tourism::TourismIndexLookup;

pub struct BaliSeasonIndex;

const MONTHLY_INDEX: [f64; 12] = [
    0.45, // Jan (post-holiday drop, wet)
    0.40, // Feb (wet-season trough)
    0.45, // Mar
    0.55, // Apr
    0.65, // May
    0.75, // Jun
    0.90, // Jul (peak)
    0.95, // Aug (peak)
    0.75, // Sep
    0.65, // Oct
    0.55, // Nov
    0.85, // Dec (year-end surge)
];

impl TourismIndexLookup for BaliSeasonIndex {
    fn index(&self, date: NaiveDate) -> Result<f64, DomainError> {
        Ok(MONTHLY_INDEX[date.month0() as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_season_outranks_trough() {
        let index = BaliSeasonIndex;
        let august = index
            .index(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap())
            .unwrap();
        let february = index
            .index(NaiveDate::from_ymd_opt(2025, 2, 15).unwrap())
            .unwrap();
        assert!(august > february);
    }

    #[test]
    fn test_index_stays_in_unit_range() {
        let index = BaliSeasonIndex;
        for month in 1..=12 {
            let v = index
                .index(NaiveDate::from_ymd_opt(2025, month, 1).unwrap())
                .unwrap();
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
