pub mod attribution;
pub mod daily_metrics;
