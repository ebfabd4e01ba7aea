pub mod fake_orders;
pub mod holidays;
pub mod metrics_repository;
pub mod model_store;
pub mod tourism;
pub mod weather;
