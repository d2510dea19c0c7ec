//! Windowed queries against a persisted day.
//!
//! Given an instant and a symmetric scope, locate the slice of each entity's
//! interval list overlapping `[instant - scope/2, instant + scope/2]` and
//! whether an interval is active exactly at the instant. Pure and
//! re-entrant: the persisted day is immutable, so concurrent callers need no
//! coordination.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::models::{IntervalSeq, PersistedDay};

/// Boundaries of one entity's interval slice for one query window.
///
/// `first_index == last_index == len` is the sentinel for "no interval
/// overlaps the window".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBoundary {
    pub first_index: usize,
    pub last_index: usize,
    pub is_active_now: bool,
    pub active_index: Option<usize>,
}

impl WindowBoundary {
    /// Inclusive index range of overlapping intervals, if any overlap.
    pub fn overlapping(&self, len: usize) -> Option<std::ops::RangeInclusive<usize>> {
        (self.first_index < len).then(|| self.first_index..=self.last_index)
    }
}

/// Compute window boundaries for one interval sequence.
pub fn boundary(seq: &IntervalSeq, instant: f64, scope: f64) -> WindowBoundary {
    let left = instant - scope * 0.5;
    let right = instant + scope * 0.5;
    let len = seq.len();
    let detect = &seq.detect[..len];
    let undetect = &seq.undetect[..len];

    let mut first = detect.partition_point(|&start| start <= left);
    if first > 0 && undetect[first - 1] > left {
        // The preceding interval still covers the window's left edge; the
        // window must not start mid-gap when an overlapping interval began
        // earlier.
        first -= 1;
    }
    if first < len && detect[first] > right {
        first = len;
    }

    let after = undetect.partition_point(|&end| end < right);
    let candidate = if after < len && detect[after] < right {
        // The following interval already overlaps the right edge.
        Some(after)
    } else {
        after.checked_sub(1)
    };
    let last = match candidate {
        Some(index) if undetect[index] >= left => index,
        _ => len,
    };

    let mut is_active_now = false;
    let mut active_index = None;
    for i in 0..len {
        if detect[i] <= instant && instant <= undetect[i] {
            is_active_now = true;
            active_index = Some(i);
            break;
        }
    }

    WindowBoundary {
        first_index: first,
        last_index: last,
        is_active_now,
        active_index,
    }
}

/// Compute boundaries for every requested entity against one persisted day.
/// Entities absent from the day map to `None` ("no data"), never an error.
pub fn window_boundaries(
    day: &PersistedDay,
    instant: f64,
    scope: f64,
    entity_ids: &[String],
) -> BTreeMap<String, Option<WindowBoundary>> {
    entity_ids
        .iter()
        .map(|id| {
            let boundary = day.intervals.get(id).map(|seq| boundary(seq, instant, scope));
            (id.clone(), boundary)
        })
        .collect()
}
