//! Single-pass reconstruction of local civil days from GMT-organized raw
//! files.
//!
//! The raw stream is consumed strictly forward: the tail of the previous
//! civil day stored at the head of a GMT file is skipped, records are fed to
//! per-entity trackers until the next local-day boundary, dangling intervals
//! are force-closed at the boundary, and the accumulated set is emitted as
//! one [`PersistedDay`]. Consecutive dates reuse the same stream cursor, so a
//! multi-day range is one linear pass, never N re-reads.

use std::collections::{BTreeMap, VecDeque};
use std::io::BufRead;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::db::models::{EntityClass, EntityIntervalSet, PersistedDay};
use crate::decode::{LineDecoder, Record};
use crate::reconstruct::config::ReconstructionConfig;
use crate::reconstruct::tracker::IntervalTracker;
use crate::tz;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Linear cursor over one or more chronologically ordered raw sources.
/// Decodes lines as it goes, silently skipping malformed ones; phase lines
/// fan out into a short queue of per-phase records.
pub struct RecordStream<R: BufRead> {
    sources: Vec<R>,
    current: usize,
    decoder: LineDecoder,
    queue: VecDeque<Record>,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(sources: Vec<R>, decoder: LineDecoder) -> Self {
        Self {
            sources,
            current: 0,
            decoder,
            queue: VecDeque::new(),
        }
    }

    /// Next decoded record, or `None` once every source is exhausted.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = self.queue.pop_front() {
                return Ok(Some(record));
            }
            match self.next_line()? {
                Some(line) => self.queue.extend(self.decoder.decode_line(&line)),
                None => return Ok(None),
            }
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        while self.current < self.sources.len() {
            line.clear();
            let read = self.sources[self.current]
                .read_line(&mut line)
                .context("failed to read raw log line")?;
            if read == 0 {
                self.current += 1;
                continue;
            }
            return Ok(Some(std::mem::take(&mut line)));
        }
        Ok(None)
    }
}

/// Drives reconstruction over a requested local-date range. One instance
/// owns the stream cursor and all per-entity tracker state for the duration
/// of the run.
pub struct DayReconstructor<R: BufRead> {
    stream: RecordStream<R>,
    lookahead: Option<Record>,
    entity_class: EntityClass,
    allow_list: Vec<String>,
    next_date: NaiveDate,
    end_date: NaiveDate,
    config: ReconstructionConfig,
    last_seen: BTreeMap<String, f64>,
}

impl<R: BufRead> DayReconstructor<R> {
    pub fn new(
        stream: RecordStream<R>,
        entity_class: EntityClass,
        allow_list: Vec<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        config: ReconstructionConfig,
    ) -> Self {
        Self {
            stream,
            lookahead: None,
            entity_class,
            allow_list,
            next_date: start_date,
            end_date,
            config,
            last_seen: BTreeMap::new(),
        }
    }

    /// Assemble the next local civil day, or `None` once the requested range
    /// is covered. Every date in the range produces a day, even when the
    /// stream holds no records for it.
    pub fn next_day(&mut self) -> Result<Option<PersistedDay>> {
        if self.next_date > self.end_date {
            return Ok(None);
        }
        let date = self.next_date;
        let day_start = tz::local_day_start(date);
        let next_date = date.succ_opt().context("local date out of range")?;
        let day_end = tz::local_day_start(next_date);

        let mut trackers: BTreeMap<String, IntervalTracker> = self
            .allow_list
            .iter()
            .map(|id| (id.clone(), IntervalTracker::new(self.entity_class)))
            .collect();

        loop {
            let record = match self.lookahead.take() {
                Some(record) => record,
                None => match self.stream.next_record()? {
                    Some(record) => record,
                    None => break,
                },
            };

            if record.timestamp < day_start {
                // Tail of the previous civil day stored in the same GMT file.
                continue;
            }
            if record.timestamp >= day_end {
                // Belongs to the next local day; hold it for the next pass.
                self.lookahead = Some(record);
                break;
            }

            let Some(tracker) = trackers.get_mut(&record.entity_id) else {
                // Outside the allow-list (includes the reserved placeholder id).
                continue;
            };
            if let Some(previous) = self.last_seen.get(&record.entity_id) {
                if record.timestamp < *previous {
                    log_warn!(
                        "timestamp regression for {}: {} after {}",
                        record.entity_id,
                        record.timestamp,
                        previous
                    );
                }
            }
            self.last_seen.insert(record.entity_id.clone(), record.timestamp);
            tracker.observe(record.timestamp, record.signal, &self.config);
        }

        let mut intervals = EntityIntervalSet::new();
        for (entity_id, mut tracker) in trackers {
            if tracker.force_close(day_end) {
                log_info!(
                    "dangling interval for {entity_id} on {date} closed at day boundary"
                );
            }
            intervals.insert(entity_id, tracker.take_intervals());
        }

        self.next_date = next_date;
        Ok(Some(PersistedDay {
            entity_class: self.entity_class,
            local_date: date,
            entity_ids: self.allow_list.clone(),
            intervals,
        }))
    }
}
