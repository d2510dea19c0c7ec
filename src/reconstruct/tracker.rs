//! Per-entity state machine pairing rising and falling signal edges into
//! closed detect/undetect intervals.

use crate::db::models::{EntityClass, IntervalSeq};
use crate::reconstruct::config::ReconstructionConfig;

/// Turns one entity's signal sequence into closed intervals.
///
/// Presence sensors pair "on" and "off" edges; a repeated "on" overwrites the
/// pending start, so only the most recent "on" before the next "off" produces
/// an interval (retriggered sensors behave this way). Phase controllers emit
/// a fixed-duration walk interval the moment the walk code appears and only
/// retrigger after the code drops back to zero.
#[derive(Debug)]
pub struct IntervalTracker {
    class: EntityClass,
    intervals: IntervalSeq,
    pending_on: Option<f64>,
    walk_active: bool,
}

impl IntervalTracker {
    pub fn new(class: EntityClass) -> Self {
        Self {
            class,
            intervals: IntervalSeq::default(),
            pending_on: None,
            walk_active: false,
        }
    }

    pub fn observe(&mut self, timestamp: f64, signal: u8, config: &ReconstructionConfig) {
        match self.class {
            EntityClass::Presence => self.observe_presence(timestamp, signal),
            EntityClass::Phase => self.observe_phase(timestamp, signal, config),
        }
    }

    fn observe_presence(&mut self, timestamp: f64, signal: u8) {
        match signal {
            1 => self.pending_on = Some(timestamp),
            0 => {
                // Off without a pending on is a spurious edge; skip it.
                if let Some(start) = self.pending_on.take() {
                    self.intervals.push(start, timestamp);
                }
            }
            _ => {}
        }
    }

    fn observe_phase(&mut self, timestamp: f64, signal: u8, config: &ReconstructionConfig) {
        if signal == config.phase_active_code {
            if !self.walk_active {
                self.intervals.push(timestamp, timestamp + config.walk_secs);
                self.walk_active = true;
            }
        } else if signal == 0 {
            self.walk_active = false;
        }
    }

    /// Close any dangling interval at a local-day boundary (or end of input)
    /// so every detect has a matching undetect before persistence. Returns
    /// true when a synthetic undetect was emitted.
    pub fn force_close(&mut self, boundary: f64) -> bool {
        self.walk_active = false;
        match self.pending_on.take() {
            Some(start) => {
                self.intervals.push(start, boundary);
                true
            }
            None => false,
        }
    }

    /// Drain the accumulated intervals, resetting the tracker for the next day.
    pub fn take_intervals(&mut self) -> IntervalSeq {
        std::mem::take(&mut self.intervals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence() -> IntervalTracker {
        IntervalTracker::new(EntityClass::Presence)
    }

    fn phase() -> IntervalTracker {
        IntervalTracker::new(EntityClass::Phase)
    }

    fn config() -> ReconstructionConfig {
        ReconstructionConfig::default()
    }

    #[test]
    fn pairs_on_and_off_edges() {
        let mut tracker = presence();
        tracker.observe(100.0, 1, &config());
        tracker.observe(110.0, 0, &config());
        tracker.observe(200.0, 1, &config());
        tracker.observe(260.0, 0, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.detect, vec![100.0, 200.0]);
        assert_eq!(seq.undetect, vec![110.0, 260.0]);
    }

    #[test]
    fn repeated_on_overwrites_pending_start() {
        let mut tracker = presence();
        tracker.observe(100.0, 1, &config());
        tracker.observe(105.0, 1, &config());
        tracker.observe(110.0, 0, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.detect, vec![105.0]);
        assert_eq!(seq.undetect, vec![110.0]);
    }

    #[test]
    fn off_without_on_is_a_no_op() {
        let mut tracker = presence();
        tracker.observe(100.0, 0, &config());
        tracker.observe(200.0, 1, &config());
        tracker.observe(210.0, 0, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.detect, vec![200.0]);
    }

    #[test]
    fn unexpected_signal_codes_are_ignored() {
        let mut tracker = presence();
        tracker.observe(100.0, 1, &config());
        tracker.observe(105.0, 3, &config());
        tracker.observe(110.0, 0, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.detect, vec![100.0]);
        assert_eq!(seq.undetect, vec![110.0]);
    }

    #[test]
    fn force_close_synthesizes_undetect() {
        let mut tracker = presence();
        tracker.observe(100.0, 1, &config());
        assert!(tracker.force_close(500.0));
        let seq = tracker.take_intervals();
        assert_eq!(seq.detect, vec![100.0]);
        assert_eq!(seq.undetect, vec![500.0]);
        // Nothing pending afterwards.
        assert!(!tracker.force_close(600.0));
    }

    #[test]
    fn walk_code_emits_fixed_duration_interval() {
        let mut tracker = phase();
        tracker.observe(1000.0, 2, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.detect, vec![1000.0]);
        assert_eq!(seq.undetect, vec![1020.0]);
    }

    #[test]
    fn walk_retriggers_only_after_zero() {
        let mut tracker = phase();
        tracker.observe(1000.0, 2, &config());
        // Still active: repeated walk codes do not emit again.
        tracker.observe(1005.0, 2, &config());
        tracker.observe(1030.0, 0, &config());
        tracker.observe(1100.0, 2, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.detect, vec![1000.0, 1100.0]);
        assert_eq!(seq.undetect, vec![1020.0, 1120.0]);
    }

    #[test]
    fn phase_ignores_other_codes() {
        let mut tracker = phase();
        tracker.observe(1000.0, 2, &config());
        // Code 1 (clearance) neither emits nor clears the active mark.
        tracker.observe(1010.0, 1, &config());
        tracker.observe(1015.0, 2, &config());
        let seq = tracker.take_intervals();
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn phase_force_close_only_clears_the_mark() {
        let mut tracker = phase();
        tracker.observe(1000.0, 2, &config());
        // Durations are fixed at emission, so there is nothing to close.
        assert!(!tracker.force_close(2000.0));
        tracker.take_intervals();
        // After closure the walk can trigger again without an intervening 0.
        tracker.observe(3000.0, 2, &config());
        assert_eq!(tracker.take_intervals().len(), 1);
    }
}
