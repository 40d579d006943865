//! Presence aggregation
//!
//! Pure functions over a single user's date -> interval map. Every function
//! allocates a fresh result and keeps no state, so they can be called from any
//! number of threads against a shared snapshot.
//!
//! Durations are not clamped: a day whose end precedes its start contributes a
//! negative duration.

use crate::model::{month_key, weekday_index, UserPresence};
use chrono::{NaiveTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of weekday buckets (Monday through Sunday)
pub const WEEKDAYS: usize = 7;

/// Per-weekday sequences of seconds, index 0 = Monday
pub type WeekdaySeries = [Vec<i64>; WEEKDAYS];

/// Start and end times (seconds since midnight) of the days on one weekday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartEnd {
    pub starts: Vec<i64>,
    pub ends: Vec<i64>,
}

impl StartEnd {
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }
}

/// Seconds elapsed since midnight, 0..=86399
pub fn seconds_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight())
}

/// Seconds between two times of day, negative when `end` precedes `start`
pub fn interval_seconds(start: NaiveTime, end: NaiveTime) -> i64 {
    seconds_since_midnight(end) - seconds_since_midnight(start)
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(items: &[i64]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let sum: i64 = items.iter().sum();
    sum as f64 / items.len() as f64
}

/// Durations of all days, grouped by weekday
pub fn group_by_weekday(days: &UserPresence) -> WeekdaySeries {
    let mut result: WeekdaySeries = Default::default();
    for (date, interval) in days {
        result[weekday_index(*date)].push(interval.duration_secs());
    }
    result
}

/// Start and end times of all days, grouped by weekday
///
/// Each day pushes exactly one start and one end, so both sequences of a
/// weekday always have the same length.
pub fn group_by_start_end(days: &UserPresence) -> [StartEnd; WEEKDAYS] {
    let mut result: [StartEnd; WEEKDAYS] = Default::default();
    for (date, interval) in days {
        let bucket = &mut result[weekday_index(*date)];
        bucket.starts.push(interval.start_secs());
        bucket.ends.push(interval.end_secs());
    }
    result
}

/// Total duration per `"YYYY.MM"` month key
pub fn group_by_month(days: &UserPresence) -> BTreeMap<String, i64> {
    let mut result = BTreeMap::new();
    for (date, interval) in days {
        *result.entry(month_key(*date)).or_insert(0) += interval.duration_secs();
    }
    result
}
