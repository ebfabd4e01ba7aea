pub mod analyze;
pub mod detect;
pub mod explain;
pub mod features;
pub mod fusion;
pub mod rules;
pub mod train;
