//! detlog: reconstructs discrete on/off activity intervals for intersection
//! sensors from raw multi-day log streams, persists one interval set per
//! local civil day, and answers windowed "what is active" queries against the
//! persisted sets.
//!
//! Raw files are organized by GMT day; reconstruction re-segments them into
//! local civil days with DST-aware boundaries. Rendering and export layers
//! are external consumers of the persisted data model.

pub mod db;
pub mod decode;
pub mod query;
pub mod reconstruct;
pub mod run_config;
pub mod tz;
mod utils;

pub use db::models::{EntityClass, EntityIntervalSet, Interval, IntervalSeq, PersistedDay};
pub use db::Database;
pub use decode::{LineDecoder, PhaseDecoder, PresenceDecoder, Record};
pub use query::{boundary, window_boundaries, WindowBoundary};
pub use reconstruct::{DayReconstructor, IntervalTracker, ReconstructionConfig, RecordStream};
pub use run_config::RunConfig;
