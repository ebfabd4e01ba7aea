pub mod metrics_repo;
pub mod migrations;
