pub mod baseline;
pub mod features;
pub mod regression;
pub mod severity;
pub mod weekday;
