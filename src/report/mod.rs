pub mod cycle_log;
pub mod progress;
pub mod summary;
