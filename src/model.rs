//! In-memory presence model
//!
//! A [`PresenceStore`] maps every user to the days they were present and the
//! clock-in/clock-out interval of each day. Stores are built in one pass from
//! parsed records and are never patched afterwards; a refresh replaces the
//! whole store.

use crate::aggregate::{interval_seconds, seconds_since_midnight};
use chrono::{Datelike, NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// Numeric user identifier as found in the presence CSV
pub type UserId = i64;

/// Days a single user was present, keyed by calendar date
pub type UserPresence = BTreeMap<NaiveDate, Interval>;

/// Clock-in/clock-out pair for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Interval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Seconds between start and end, negative when end precedes start
    pub fn duration_secs(&self) -> i64 {
        interval_seconds(self.start, self.end)
    }

    pub fn start_secs(&self) -> i64 {
        seconds_since_midnight(self.start)
    }

    pub fn end_secs(&self) -> i64 {
        seconds_since_midnight(self.end)
    }
}

/// One accepted CSV row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub interval: Interval,
}

/// Weekday index with Monday = 0 through Sunday = 6
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// Year-month grouping key, always zero-padded (`"2013.09"`)
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}.{:02}", date.year(), date.month())
}

/// Presence intervals of all users
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceStore {
    users: BTreeMap<UserId, UserPresence>,
}

impl PresenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in source order
    ///
    /// Returns the store and the number of records that replaced an earlier
    /// record for the same user and date.
    pub fn from_records<I>(records: I) -> (Self, usize)
    where
        I: IntoIterator<Item = PresenceRecord>,
    {
        let mut store = Self::new();
        let mut overwritten = 0;
        for record in records {
            if store.insert(record).is_some() {
                overwritten += 1;
            }
        }
        (store, overwritten)
    }

    /// Last write wins for a repeated (user, date) pair
    pub(crate) fn insert(&mut self, record: PresenceRecord) -> Option<Interval> {
        self.users
            .entry(record.user_id)
            .or_default()
            .insert(record.date, record.interval)
    }

    /// Presence days of a user, `None` when the user never appeared
    pub fn user(&self, user_id: UserId) -> Option<&UserPresence> {
        self.users.get(&user_id)
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    /// User ids in ascending order
    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UserId, &UserPresence)> {
        self.users.iter().map(|(id, days)| (*id, days))
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Total number of (user, date) entries
    pub fn record_count(&self) -> usize {
        self.users.values().map(BTreeMap::len).sum()
    }
}

impl FromIterator<PresenceRecord> for PresenceStore {
    fn from_iter<I: IntoIterator<Item = PresenceRecord>>(iter: I) -> Self {
        Self::from_records(iter).0
    }
}
