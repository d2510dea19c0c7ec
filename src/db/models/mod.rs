pub mod day;

pub use day::{EntityClass, EntityIntervalSet, Interval, IntervalSeq, PersistedDay};
