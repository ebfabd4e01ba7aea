//! Fixed per-weekday expected sales deviation, in percent of the weekly
//! average. Informational only: the table explains an already-flagged day,
//! it never drives remediation.

use chrono::Weekday;

/// Expected deviation from average sales for a weekday, in percent.
/// Mondays run well below average; weekends above.
pub fn expected_deviation_pct(weekday: Weekday) -> f64 {
    match weekday {
        Weekday::Mon => -15.0,
        Weekday::Tue => -5.0,
        Weekday::Wed => 0.0,
        Weekday::Thu => 0.0,
        Weekday::Fri => 5.0,
        Weekday::Sat => 10.0,
        Weekday::Sun => 5.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monday_is_the_weak_day() {
        let worst = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .min_by(|a, b| {
            expected_deviation_pct(*a)
                .partial_cmp(&expected_deviation_pct(*b))
                .unwrap()
        })
        .unwrap();
        assert_eq!(worst, Weekday::Mon);
    }

    #[test]
    fn test_midweek_is_neutral() {
        assert_eq!(expected_deviation_pct(Weekday::Wed), 0.0);
        assert_eq!(expected_deviation_pct(Weekday::Thu), 0.0);
    }
}
