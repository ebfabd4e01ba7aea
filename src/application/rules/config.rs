//! The single tunable threshold table behind the rule engine.
//!
//! The production system grew half a dozen analyzer variants, each with its
//! own copy of these constants; they are consolidated here as one
//! configurable table. The impact scores are empirically chosen operating
//! points, not validated ground truth — treat them as defaults to tune, and
//! keep every check reading from this struct rather than inlining numbers.

use serde::Serialize;

/// Outage severity band: at or above `min_minutes` of platform downtime,
/// apply `impact`.
#[derive(Debug, Clone, Serialize)]
pub struct OutageBand {
    pub min_minutes: f64,
    pub impact: f64,
    /// Marks the band that warrants a critical callout in the description.
    pub critical: bool,
}

/// Precipitation band with an independently signed impact. The signs are
/// deliberately non-monotonic: light rain lifts delivery orders (people stay
/// in), heavy rain suppresses them (couriers go offline). Never assume a
/// uniform negative correlation.
#[derive(Debug, Clone, Serialize)]
pub struct RainBand {
    pub min_mm: f64,
    pub impact: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleConfig {
    /// Holiday factors below this |expected impact| are noise and skipped.
    pub holiday_materiality_pct: f64,

    /// Sorted by descending `min_minutes`; first matching band wins.
    pub outage_bands: Vec<OutageBand>,
    /// Cap on the accumulated outage score across platforms.
    pub outage_score_cap: f64,
    /// A platform reporting zero sales while the other sold normally.
    pub silent_platform_impact: f64,

    pub out_of_stock_impact: f64,
    pub busy_impact: f64,

    /// ROAS below this with non-zero spend means ads burn money.
    pub low_roas_threshold: f64,
    pub low_roas_impact: f64,
    /// Spend at zero against a non-zero trailing 7-day average.
    pub ads_disabled_impact: f64,

    pub low_rating_threshold: f64,
    pub low_rating_impact: f64,
    pub soft_rating_threshold: f64,
    pub soft_rating_impact: f64,

    /// Weekday deviations below this |pct| are not worth surfacing.
    pub weekday_materiality_pct: f64,

    /// Sorted by descending `min_mm`; first matching band wins.
    pub rain_bands: Vec<RainBand>,
    pub temperature_low_c: f64,
    pub temperature_high_c: f64,
    pub extreme_temperature_impact: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            holiday_materiality_pct: 15.0,

            outage_bands: vec![
                OutageBand {
                    min_minutes: 300.0,
                    impact: -50.0,
                    critical: true,
                },
                OutageBand {
                    min_minutes: 60.0,
                    impact: -30.0,
                    critical: false,
                },
                OutageBand {
                    min_minutes: 1.0,
                    impact: -10.0,
                    critical: false,
                },
            ],
            outage_score_cap: 80.0,
            silent_platform_impact: -25.0,

            out_of_stock_impact: -15.0,
            busy_impact: -10.0,

            low_roas_threshold: 1.0,
            low_roas_impact: -25.0,
            ads_disabled_impact: -20.0,

            low_rating_threshold: 3.5,
            low_rating_impact: -30.0,
            soft_rating_threshold: 4.0,
            soft_rating_impact: -15.0,

            weekday_materiality_pct: 10.0,

            rain_bands: vec![
                RainBand {
                    min_mm: 25.0,
                    impact: -25.0,
                    label: "extreme rain",
                },
                RainBand {
                    min_mm: 15.0,
                    impact: -15.0,
                    label: "heavy rain",
                },
                RainBand {
                    min_mm: 5.0,
                    impact: -8.0,
                    label: "moderate rain",
                },
                RainBand {
                    min_mm: 0.5,
                    impact: 5.0,
                    label: "light rain",
                },
            ],
            temperature_low_c: 22.0,
            temperature_high_c: 35.0,
            extreme_temperature_impact: -10.0,
        }
    }
}

impl RuleConfig {
    pub fn outage_band(&self, minutes: f64) -> Option<&OutageBand> {
        self.outage_bands.iter().find(|b| minutes >= b.min_minutes)
    }

    pub fn rain_band(&self, precipitation_mm: f64) -> Option<&RainBand> {
        self.rain_bands.iter().find(|b| precipitation_mm >= b.min_mm)
    }
}
