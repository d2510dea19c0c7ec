use anyhow::{bail, Result};

use crate::decode::Record;

/// Number of signal-code fields on a phase-controller line.
pub const PHASE_FIELD_COUNT: usize = 16;

/// Decoder for fixed-field phase-controller lines: a literal tag token, a
/// time field, then one signal code per phase index. Each code fans out into
/// an independent [`Record`] carrying the id configured for that index.
#[derive(Debug, Clone)]
pub struct PhaseDecoder {
    tag: String,
    phase_ids: Vec<String>,
}

impl PhaseDecoder {
    pub fn new(tag: impl Into<String>, phase_ids: Vec<String>) -> Result<Self> {
        if phase_ids.len() != PHASE_FIELD_COUNT {
            bail!(
                "phase decoder needs {} phase ids, got {}",
                PHASE_FIELD_COUNT,
                phase_ids.len()
            );
        }
        Ok(Self {
            tag: tag.into(),
            phase_ids,
        })
    }

    /// Decode one line into per-phase records. An empty result means the
    /// line is malformed or carries a different tag.
    pub fn decode(&self, line: &str) -> Vec<Record> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != PHASE_FIELD_COUNT + 2 || fields[0] != self.tag {
            return Vec::new();
        }
        let Ok(timestamp) = fields[1].parse::<f64>() else {
            return Vec::new();
        };

        let mut records = Vec::with_capacity(PHASE_FIELD_COUNT);
        for (index, raw) in fields[2..].iter().enumerate() {
            let Ok(signal) = raw.parse::<u8>() else {
                return Vec::new();
            };
            records.push(Record {
                entity_id: self.phase_ids[index].clone(),
                timestamp,
                signal,
            });
        }
        records
    }
}
