//! Raw log line decoders.
//!
//! Two physical line formats exist in the captured logs: space-delimited
//! 3-field presence-sensor lines and fixed-field phase-controller lines
//! identified by a literal tag token. Both decode into the same abstract
//! [`Record`] shape; a phase line fans out into one record per phase index.
//!
//! Malformed lines are common (truncated final lines in particular) and are
//! skipped, never treated as errors.

pub mod phase;
pub mod presence;

pub use phase::{PhaseDecoder, PHASE_FIELD_COUNT};
pub use presence::PresenceDecoder;

/// One decoded observation: an entity, an absolute timestamp (seconds since
/// the Unix epoch, GMT), and a raw signal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity_id: String,
    pub timestamp: f64,
    pub signal: u8,
}

/// Format-specific decoder for one entity class.
pub enum LineDecoder {
    Presence(PresenceDecoder),
    Phase(PhaseDecoder),
}

impl LineDecoder {
    /// Decode one raw line. An empty result means the line was malformed or
    /// irrelevant and should be skipped.
    pub fn decode_line(&self, line: &str) -> Vec<Record> {
        match self {
            LineDecoder::Presence(decoder) => decoder.decode(line).into_iter().collect(),
            LineDecoder::Phase(decoder) => decoder.decode(line),
        }
    }
}
