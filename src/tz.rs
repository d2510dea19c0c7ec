//! Local civil time offsets for the reconstruction timezone (PST/PDT).
//!
//! Raw log files are organized by GMT day; analysis wants local civil days.
//! The offset is the number of hours to subtract from the reference (GMT)
//! clock to get local time: 8 normally, 7 while daylight saving is in
//! effect (second Sunday of March through first Sunday of November).

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

const STANDARD_OFFSET_HOURS: i64 = 8;
const DAYLIGHT_OFFSET_HOURS: i64 = 7;

/// Hours to subtract from the reference clock to get local civil time.
pub fn offset_hours(date: NaiveDate) -> i64 {
    let dst_start = nth_sunday(date.year(), 3, 2);
    let dst_end = nth_sunday(date.year(), 11, 1);
    if date >= dst_start && date <= dst_end {
        DAYLIGHT_OFFSET_HOURS
    } else {
        STANDARD_OFFSET_HOURS
    }
}

/// Absolute (GMT) timestamp of local midnight for `date`, in seconds since
/// the Unix epoch. Consecutive dates may use different offsets when a DST
/// transition falls between them.
pub fn local_day_start(date: NaiveDate) -> f64 {
    let utc_midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    (utc_midnight + offset_hours(date) * 3600) as f64
}

fn nth_sunday(year: i32, month: u32, nth: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .expect("first of month is a valid date");
    let days_to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    first + Duration::days(i64::from(days_to_sunday) + (i64::from(nth) - 1) * 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nth_sunday_matches_calendar() {
        // 2023: DST starts Mar 12, ends Nov 5.
        assert_eq!(nth_sunday(2023, 3, 2), date(2023, 3, 12));
        assert_eq!(nth_sunday(2023, 11, 1), date(2023, 11, 5));
        // 2016: Mar 13 / Nov 6.
        assert_eq!(nth_sunday(2016, 3, 2), date(2016, 3, 13));
        assert_eq!(nth_sunday(2016, 11, 1), date(2016, 11, 6));
        // March 1st falling on a Sunday (2020): second Sunday is Mar 8.
        assert_eq!(nth_sunday(2020, 3, 2), date(2020, 3, 8));
    }

    #[test]
    fn offset_flips_at_dst_boundaries() {
        assert_eq!(offset_hours(date(2023, 3, 11)), 8);
        assert_eq!(offset_hours(date(2023, 3, 12)), 7);
        assert_eq!(offset_hours(date(2023, 7, 1)), 7);
        assert_eq!(offset_hours(date(2023, 11, 5)), 7);
        assert_eq!(offset_hours(date(2023, 11, 6)), 8);
        assert_eq!(offset_hours(date(2023, 1, 15)), 8);
        assert_eq!(offset_hours(date(2023, 12, 25)), 8);
    }

    #[test]
    fn day_start_applies_offset() {
        // 2023-06-15 00:00 UTC = 1686787200; local midnight is 7h later.
        assert_eq!(local_day_start(date(2023, 6, 15)), 1686787200.0 + 7.0 * 3600.0);
        // 2023-01-15 00:00 UTC = 1673740800; standard time, 8h.
        assert_eq!(local_day_start(date(2023, 1, 15)), 1673740800.0 + 8.0 * 3600.0);
    }

    #[test]
    fn dst_transition_days_span_23_and_25_hours() {
        // The day whose start uses the standard offset and whose end uses the
        // daylight offset spans 23 hours; the reverse spans 25.
        let short = local_day_start(date(2023, 3, 12)) - local_day_start(date(2023, 3, 11));
        assert_eq!(short, 23.0 * 3600.0);
        let long = local_day_start(date(2023, 11, 6)) - local_day_start(date(2023, 11, 5));
        assert_eq!(long, 25.0 * 3600.0);
        // A plain mid-summer day is exactly 24 hours.
        let plain = local_day_start(date(2023, 6, 16)) - local_day_start(date(2023, 6, 15));
        assert_eq!(plain, 24.0 * 3600.0);
    }
}
