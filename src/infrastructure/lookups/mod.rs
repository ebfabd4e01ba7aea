pub mod holiday_calendar;
pub mod open_meteo;
pub mod static_weather;
pub mod tourism_season;
