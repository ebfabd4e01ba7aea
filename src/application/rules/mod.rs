//! Deterministic rule-based attribution for one problem day.
//!
//! The engine runs an ordered battery of factor checks. The battery never
//! short-circuits: every check always runs, and the order only sets display
//! priority (holiday first, weather last). Factors carry signed impact
//! scores; the aggregate severity class comes from the sum of their
//! magnitudes.

pub mod config;

use chrono::Datelike;

use crate::domain::entities::attribution::{Attribution, Factor, FactorKind, ProblemDay};
use crate::domain::entities::daily_metrics::{DailyMetrics, Platform};
use crate::domain::ports::holidays::HolidayInfo;
use crate::domain::ports::weather::WeatherObservation;
use crate::domain::values::baseline::Baseline;
use crate::domain::values::weekday::expected_deviation_pct;

pub use config::RuleConfig;

/// Everything the battery needs for one day. External lookups are resolved
/// (and degraded to defaults where necessary) by the caller before the
/// engine runs, so the checks themselves are pure.
pub struct AttributionInput<'a> {
    pub day: &'a DailyMetrics,
    pub problem: &'a ProblemDay,
    pub baseline: &'a Baseline,
    pub weather: WeatherObservation,
    pub holiday: Option<HolidayInfo>,
}

pub struct RuleAttributionEngine {
    config: RuleConfig,
}

impl RuleAttributionEngine {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Run all checks and package the ranked factors, severity class and
    /// recommendations for one problem day.
    pub fn attribute(&self, input: &AttributionInput) -> Attribution {
        let mut factors = Vec::new();

        self.check_holiday(input, &mut factors);
        self.check_outages(input, &mut factors);
        self.check_stock(input, &mut factors);
        self.check_marketing(input, &mut factors);
        self.check_ratings(input, &mut factors);
        self.check_weekday(input, &mut factors);
        self.check_weather(input, &mut factors);

        let recommendations = recommendations_for(&factors);
        Attribution::new(
            input.day.restaurant_id,
            input.problem.clone(),
            factors,
            recommendations,
        )
    }

    // 1. Holiday (informational: the calendar is not actionable).
    fn check_holiday(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        let Some(holiday) = &input.holiday else {
            return;
        };
        if holiday.expected_impact_pct.abs() <= self.config.holiday_materiality_pct {
            return;
        }
        factors.push(Factor {
            kind: FactorKind::Holiday,
            platform: None,
            description: format!(
                "Holiday '{}' (expected impact {:+.0}%)",
                holiday.name, holiday.expected_impact_pct
            ),
            impact_score: holiday.expected_impact_pct,
            actionable: false,
        });
    }

    // 2. Operational outages, each platform judged independently.
    fn check_outages(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        let mut accumulated = 0.0_f64;
        for platform in [Platform::Grab, Platform::Gojek] {
            let metrics = input.day.platform(platform);
            if !metrics.reported {
                continue;
            }

            if let Some(band) = self.config.outage_band(metrics.offline_minutes) {
                let remaining = (self.config.outage_score_cap - accumulated).max(0.0);
                let impact = band.impact.max(-remaining);
                accumulated += impact.abs();
                let hours = metrics.offline_minutes / 60.0;
                let prefix = if band.critical { "Critical: " } else { "" };
                factors.push(Factor {
                    kind: FactorKind::OperationalOutage,
                    platform: Some(platform),
                    description: format!("{prefix}{platform} offline for {hours:.1}h"),
                    impact_score: impact,
                    actionable: true,
                });
            }

            // A platform that reported but sold nothing while the other side
            // sold normally points at a platform-side failure even when no
            // downtime was recorded.
            let other = input.day.platform(other_platform(platform));
            if metrics.sales == 0.0
                && metrics.offline_minutes == 0.0
                && other.reported
                && other.sales > 0.0
            {
                factors.push(Factor {
                    kind: FactorKind::OperationalOutage,
                    platform: Some(platform),
                    description: format!("{platform} recorded zero sales while the other platform sold normally"),
                    impact_score: self.config.silent_platform_impact,
                    actionable: true,
                });
            }
        }
    }

    // 3. Stock and capacity flags.
    fn check_stock(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        for platform in [Platform::Grab, Platform::Gojek] {
            let metrics = input.day.platform(platform);
            if metrics.out_of_stock {
                factors.push(Factor {
                    kind: FactorKind::StockIssue,
                    platform: Some(platform),
                    description: format!("{platform} reported items out of stock"),
                    impact_score: self.config.out_of_stock_impact,
                    actionable: true,
                });
            }
            if metrics.busy {
                factors.push(Factor {
                    kind: FactorKind::StockIssue,
                    platform: Some(platform),
                    description: format!("{platform} marked the store busy/overloaded"),
                    impact_score: self.config.busy_impact,
                    actionable: true,
                });
            }
        }
    }

    // 4. Marketing efficiency.
    fn check_marketing(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        for platform in [Platform::Grab, Platform::Gojek] {
            let metrics = input.day.platform(platform);
            if metrics.ads_spend > 0.0 {
                let roas = metrics.roas();
                if roas < self.config.low_roas_threshold {
                    factors.push(Factor {
                        kind: FactorKind::Marketing,
                        platform: Some(platform),
                        description: format!("{platform} ROAS {roas:.2} — ads returned less than they cost"),
                        impact_score: self.config.low_roas_impact,
                        actionable: true,
                    });
                }
            }
        }

        // Ads switched off against a non-zero trailing average.
        if input.day.total_ad_spend() == 0.0 {
            if let Some(trailing) = input.baseline.rolling_7d_ad_spend {
                if trailing > 0.0 {
                    factors.push(Factor {
                        kind: FactorKind::Marketing,
                        platform: None,
                        description: format!(
                            "Ads disabled (trailing 7d average spend {trailing:.0})"
                        ),
                        impact_score: self.config.ads_disabled_impact,
                        actionable: true,
                    });
                }
            }
        }
    }

    // 5. Ratings.
    fn check_ratings(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        for platform in [Platform::Grab, Platform::Gojek] {
            let Some(rating) = input.day.platform(platform).rating else {
                continue;
            };
            if rating < self.config.low_rating_threshold {
                factors.push(Factor {
                    kind: FactorKind::Rating,
                    platform: Some(platform),
                    description: format!("{platform} rating {rating:.2} — service quality review needed"),
                    impact_score: self.config.low_rating_impact,
                    actionable: true,
                });
            } else if rating < self.config.soft_rating_threshold {
                factors.push(Factor {
                    kind: FactorKind::Rating,
                    platform: Some(platform),
                    description: format!("{platform} rating {rating:.2} below average"),
                    impact_score: self.config.soft_rating_impact,
                    actionable: false,
                });
            }
        }
    }

    // 6. Weekday pattern (informational).
    fn check_weekday(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        let weekday = input.day.date.weekday();
        let expected = expected_deviation_pct(weekday);
        if expected.abs() > self.config.weekday_materiality_pct {
            factors.push(Factor {
                kind: FactorKind::Weekday,
                platform: None,
                description: format!("{weekday} typically runs {expected:+.0}% vs average"),
                impact_score: expected,
                actionable: false,
            });
        }
    }

    // 7. Weather (informational; banded, independently signed).
    fn check_weather(&self, input: &AttributionInput, factors: &mut Vec<Factor>) {
        let weather = &input.weather;
        if let Some(band) = self.config.rain_band(weather.precipitation_mm) {
            factors.push(Factor {
                kind: FactorKind::Weather,
                platform: None,
                description: format!("{} ({:.1}mm)", band.label, weather.precipitation_mm),
                impact_score: band.impact,
                actionable: false,
            });
        }
        if weather.temperature_c < self.config.temperature_low_c
            || weather.temperature_c > self.config.temperature_high_c
        {
            factors.push(Factor {
                kind: FactorKind::Weather,
                platform: None,
                description: format!("Extreme temperature {:.1}C", weather.temperature_c),
                impact_score: self.config.extreme_temperature_impact,
                actionable: false,
            });
        }
    }
}

fn other_platform(platform: Platform) -> Platform {
    match platform {
        Platform::Grab => Platform::Gojek,
        Platform::Gojek => Platform::Grab,
    }
}

/// Remediation text per factor kind. Only actionable factors produce
/// recommendations; weather, weekday and holiday explain, they don't
/// prescribe.
fn recommendations_for(factors: &[Factor]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for factor in factors.iter().filter(|f| f.actionable) {
        let texts: &[&str] = match factor.kind {
            FactorKind::OperationalOutage => &[
                "Investigate platform availability and store-open hours",
                "Set up downtime alerts for both platforms",
            ],
            FactorKind::StockIssue => &[
                "Review stock levels and menu availability before peak hours",
            ],
            FactorKind::Marketing => &[
                "Review ad campaign targeting and budget",
                "Restore ad spend to its recent level",
            ],
            FactorKind::Rating => &[
                "Run a service-quality review and respond to recent reviews",
            ],
            // Informational kinds are filtered out by `actionable` above.
            _ => &[],
        };
        for t in texts {
            if !out.iter().any(|existing| existing == t) {
                out.push((*t).to_string());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::attribution::DeviationType;
    use crate::domain::entities::daily_metrics::{FakeOrderAdjustment, RawPlatformRecord};
    use crate::domain::values::severity::{Severity, SeverityClass};
    use chrono::NaiveDate;

    fn quiet_record() -> RawPlatformRecord {
        RawPlatformRecord {
            sales: 1_000_000.0,
            orders: 30,
            rating: Some(4.7),
            ads_spend: 100_000.0,
            ads_sales: 400_000.0,
            ..Default::default()
        }
    }

    fn input_parts(
        grab: RawPlatformRecord,
        gojek: RawPlatformRecord,
        date: &str,
    ) -> (DailyMetrics, ProblemDay, Baseline) {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let day =
            DailyMetrics::fuse(1, date, Some(grab), Some(gojek), FakeOrderAdjustment::default())
                .unwrap();
        let problem = ProblemDay {
            date,
            sales: day.total_sales(),
            deviation: 0.3,
            deviation_type: DeviationType::RelativeDrop,
            severity: Severity::Significant,
        };
        let baseline = Baseline {
            restaurant_id: 1,
            as_of_date: date,
            rolling_7d_avg: Some(1_500_000.0),
            rolling_30d_avg: Some(1_400_000.0),
            gradient_7d: Some(-200_000.0),
            rolling_7d_ad_spend: Some(150_000.0),
        };
        (day, problem, baseline)
    }

    fn dry() -> WeatherObservation {
        WeatherObservation {
            precipitation_mm: 0.0,
            temperature_c: 28.0,
            wind_speed_kmh: 5.0,
        }
    }

    #[test]
    fn test_quiet_day_yields_low_severity() {
        // Wednesday, dry, good ratings, healthy ROAS, no outage, no holiday.
        let (day, problem, baseline) = input_parts(quiet_record(), quiet_record(), "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });

        assert!(attribution.factors.is_empty());
        assert_eq!(attribution.severity_class, SeverityClass::Low);
        assert!(attribution.recommendations.is_empty());
    }

    #[test]
    fn test_long_outage_is_critical_and_actionable() {
        let mut grab = quiet_record();
        grab.offline_minutes = 360.0;
        let (day, problem, baseline) = input_parts(grab, quiet_record(), "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });

        let outage = attribution
            .factors
            .iter()
            .find(|f| f.kind == FactorKind::OperationalOutage)
            .expect("outage factor");
        assert_eq!(outage.platform, Some(Platform::Grab));
        assert_eq!(outage.impact_score, -50.0);
        assert!(outage.actionable);
        assert!(outage.description.starts_with("Critical"));
        assert!(!attribution.recommendations.is_empty());
    }

    #[test]
    fn test_outage_scores_accumulate_under_cap() {
        let mut grab = quiet_record();
        grab.offline_minutes = 360.0;
        let mut gojek = quiet_record();
        gojek.offline_minutes = 320.0;
        let (day, problem, baseline) = input_parts(grab, gojek, "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });

        let total: f64 = attribution
            .factors
            .iter()
            .filter(|f| f.kind == FactorKind::OperationalOutage)
            .map(|f| f.impact_score.abs())
            .sum();
        // -50 + -50 would exceed the cap; second factor is clamped to -30.
        assert_eq!(total, 80.0);
    }

    #[test]
    fn test_opposite_rain_signs_reachable() {
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let (day, problem, baseline) = input_parts(quiet_record(), quiet_record(), "2025-04-16");

        let mut light = dry();
        light.precipitation_mm = 2.0;
        let light_attr = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: light,
            holiday: None,
        });

        let mut heavy = dry();
        heavy.precipitation_mm = 20.0;
        let heavy_attr = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: heavy,
            holiday: None,
        });

        let light_factor = light_attr
            .factors
            .iter()
            .find(|f| f.kind == FactorKind::Weather)
            .unwrap();
        let heavy_factor = heavy_attr
            .factors
            .iter()
            .find(|f| f.kind == FactorKind::Weather)
            .unwrap();
        assert!(light_factor.impact_score > 0.0);
        assert!(heavy_factor.impact_score < 0.0);
        assert!(!light_factor.actionable && !heavy_factor.actionable);
    }

    #[test]
    fn test_low_roas_and_ads_disabled() {
        let mut grab = quiet_record();
        grab.ads_spend = 200_000.0;
        grab.ads_sales = 120_000.0; // ROAS 0.6
        let mut gojek = quiet_record();
        gojek.ads_spend = 0.0;
        gojek.ads_sales = 0.0;
        let (day, problem, baseline) = input_parts(grab, gojek, "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });

        let marketing: Vec<_> = attribution
            .factors
            .iter()
            .filter(|f| f.kind == FactorKind::Marketing)
            .collect();
        // Low ROAS on Grab; total spend is non-zero so no "ads disabled".
        assert_eq!(marketing.len(), 1);
        assert_eq!(marketing[0].platform, Some(Platform::Grab));
    }

    #[test]
    fn test_ads_disabled_against_trailing_average() {
        let mut grab = quiet_record();
        grab.ads_spend = 0.0;
        grab.ads_sales = 0.0;
        let mut gojek = quiet_record();
        gojek.ads_spend = 0.0;
        gojek.ads_sales = 0.0;
        let (day, problem, baseline) = input_parts(grab, gojek, "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });

        assert!(attribution
            .factors
            .iter()
            .any(|f| f.kind == FactorKind::Marketing && f.description.contains("disabled")));
    }

    #[test]
    fn test_rating_bands() {
        let mut grab = quiet_record();
        grab.rating = Some(3.2);
        let mut gojek = quiet_record();
        gojek.rating = Some(3.8);
        let (day, problem, baseline) = input_parts(grab, gojek, "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });

        let ratings: Vec<_> = attribution
            .factors
            .iter()
            .filter(|f| f.kind == FactorKind::Rating)
            .collect();
        assert_eq!(ratings.len(), 2);
        assert!(ratings.iter().any(|f| f.impact_score == -30.0 && f.actionable));
        assert!(ratings.iter().any(|f| f.impact_score == -15.0 && !f.actionable));
        assert!(attribution
            .recommendations
            .iter()
            .any(|r| r.contains("service-quality")));
    }

    #[test]
    fn test_weekday_factor_only_above_materiality() {
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        // Monday: -15% expected, above the 10% materiality bar.
        let (day, problem, baseline) = input_parts(quiet_record(), quiet_record(), "2025-04-14");
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });
        let weekday = attribution
            .factors
            .iter()
            .find(|f| f.kind == FactorKind::Weekday)
            .expect("monday factor");
        assert!(!weekday.actionable);

        // Friday: +5%, under the bar.
        let (day, problem, baseline) = input_parts(quiet_record(), quiet_record(), "2025-04-18");
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: None,
        });
        assert!(attribution
            .factors
            .iter()
            .all(|f| f.kind != FactorKind::Weekday));
    }

    #[test]
    fn test_holiday_factor_never_recommends() {
        use crate::domain::ports::holidays::{HolidayCategory, HolidayInfo};
        let (day, problem, baseline) = input_parts(quiet_record(), quiet_record(), "2025-04-16");
        let engine = RuleAttributionEngine::new(RuleConfig::default());
        let attribution = engine.attribute(&AttributionInput {
            day: &day,
            problem: &problem,
            baseline: &baseline,
            weather: dry(),
            holiday: Some(HolidayInfo {
                name: "Nyepi".into(),
                category: HolidayCategory::Balinese,
                expected_impact_pct: -95.0,
            }),
        });

        let holiday = attribution
            .factors
            .iter()
            .find(|f| f.kind == FactorKind::Holiday)
            .expect("holiday factor");
        assert!(!holiday.actionable);
        assert!(attribution.recommendations.is_empty());
    }
}
