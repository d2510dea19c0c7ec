//! Persisted per-day interval data model.
//!
//! One `PersistedDay` exists per (entity class, local civil date); it is the
//! sole durable artifact of reconstruction and is immutable once written.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category of sensor source. Each class has its own line format and
/// allow-list and reconstructs from its own files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Presence,
    Phase,
}

impl EntityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Presence => "presence",
            EntityClass::Phase => "phase",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "presence" => Ok(EntityClass::Presence),
            "phase" => Ok(EntityClass::Phase),
            other => Err(anyhow!("unknown entity class {other}")),
        }
    }
}

/// One closed activity interval: the entity was continuously active from
/// `start` to `end` (absolute seconds, `start <= end`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

/// Parallel detect/undetect timestamp sequences for one entity, ascending by
/// start time and non-overlapping. The two vectors are equal length except
/// transiently while an interval is open during reconstruction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSeq {
    pub detect: Vec<f64>,
    pub undetect: Vec<f64>,
}

impl IntervalSeq {
    /// Number of closed intervals.
    pub fn len(&self) -> usize {
        self.detect.len().min(self.undetect.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, start: f64, end: f64) {
        self.detect.push(start);
        self.undetect.push(end);
    }

    pub fn get(&self, index: usize) -> Option<Interval> {
        if index < self.len() {
            Some(Interval {
                start: self.detect[index],
                end: self.undetect[index],
            })
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Interval> + '_ {
        (0..self.len()).map(|i| Interval {
            start: self.detect[i],
            end: self.undetect[i],
        })
    }
}

/// Ordered mapping from entity id to its interval sequence. Ordered so that
/// persistence walks entities deterministically.
pub type EntityIntervalSet = BTreeMap<String, IntervalSeq>;

/// All reconstructed intervals for one local civil day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDay {
    pub entity_class: EntityClass,
    pub local_date: NaiveDate,
    /// Allow-list the day was built for, in the order it was supplied.
    pub entity_ids: Vec<String>,
    pub intervals: EntityIntervalSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_class_round_trips() {
        assert_eq!(EntityClass::parse("presence").unwrap(), EntityClass::Presence);
        assert_eq!(EntityClass::parse("phase").unwrap(), EntityClass::Phase);
        assert_eq!(EntityClass::Presence.as_str(), "presence");
        assert!(EntityClass::parse("bicycle").is_err());
    }

    #[test]
    fn interval_seq_pairs_parallel_arrays() {
        let mut seq = IntervalSeq::default();
        seq.push(100.0, 110.0);
        seq.push(200.0, 260.0);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0), Some(Interval { start: 100.0, end: 110.0 }));
        assert_eq!(seq.get(2), None);
        let collected: Vec<Interval> = seq.iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[1].end, 260.0);
    }

    #[test]
    fn open_interval_is_not_counted() {
        // While an interval is open the detect array is one longer.
        let seq = IntervalSeq {
            detect: vec![100.0, 200.0],
            undetect: vec![110.0],
        };
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.get(1), None);
    }
}
