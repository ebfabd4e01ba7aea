pub mod lookups;
pub mod model_store;
pub mod sqlite;
