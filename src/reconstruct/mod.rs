pub mod config;
pub mod day;
pub mod tracker;

pub use config::ReconstructionConfig;
pub use day::{DayReconstructor, RecordStream};
pub use tracker::IntervalTracker;
