//! Dashboard series built from cached snapshots
//!
//! Each function picks one user out of a snapshot, runs an aggregator and
//! shapes the result into rows that serialize as JSON arrays
//! (`["Mon", 30600.0]`). An unknown user is [`Error::UserNotFound`]; a user
//! with no recorded days yields well-formed rows of zeros.

use crate::aggregate::{group_by_month, group_by_start_end, group_by_weekday, mean};
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::model::{PresenceStore, UserId, UserPresence};
use serde::Serialize;

/// Weekday labels, index 0 = Monday
pub const WEEKDAY_ABBR: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Entry of the user picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub name: String,
}

fn user_days(store: &PresenceStore, user_id: UserId) -> Result<&UserPresence> {
    store.user(user_id).ok_or_else(|| {
        tracing::debug!(user_id, "User not found");
        Error::UserNotFound(user_id)
    })
}

/// All directory users, numeric ids in numeric order
pub fn users(directory: &Directory) -> Vec<UserSummary> {
    let mut users: Vec<UserSummary> = directory
        .iter()
        .map(|entry| UserSummary {
            user_id: entry.user_id.clone(),
            name: entry.display_name.clone(),
        })
        .collect();
    users.sort_by_key(|u| (u.user_id.parse::<i64>().unwrap_or(i64::MAX), u.user_id.clone()));
    users
}

/// Avatar URL of a user
pub fn avatar(directory: &Directory, user_id: UserId) -> Result<String> {
    directory
        .get_user(user_id)
        .map(|entry| entry.avatar_url.clone())
        .ok_or(Error::UserNotFound(user_id))
}

/// Mean presence per weekday, in seconds
pub fn mean_time_weekday(store: &PresenceStore, user_id: UserId) -> Result<Vec<(&'static str, f64)>> {
    let weekdays = group_by_weekday(user_days(store, user_id)?);
    Ok(WEEKDAY_ABBR
        .iter()
        .zip(weekdays.iter())
        .map(|(day, intervals)| (*day, mean(intervals)))
        .collect())
}

/// Total presence per weekday, in seconds
pub fn presence_weekday(store: &PresenceStore, user_id: UserId) -> Result<Vec<(&'static str, i64)>> {
    let weekdays = group_by_weekday(user_days(store, user_id)?);
    Ok(WEEKDAY_ABBR
        .iter()
        .zip(weekdays.iter())
        .map(|(day, intervals)| (*day, intervals.iter().sum()))
        .collect())
}

/// Mean start and mean end per weekday, in seconds since midnight
pub fn presence_start_end(
    store: &PresenceStore,
    user_id: UserId,
) -> Result<Vec<(&'static str, f64, f64)>> {
    let weekdays = group_by_start_end(user_days(store, user_id)?);
    Ok(WEEKDAY_ABBR
        .iter()
        .zip(weekdays.iter())
        .map(|(day, bucket)| (*day, mean(&bucket.starts), mean(&bucket.ends)))
        .collect())
}

/// Total presence per month, ordered by `"YYYY.MM"` key
pub fn monthly_presence(store: &PresenceStore, user_id: UserId) -> Result<Vec<(String, i64)>> {
    let months = group_by_month(user_days(store, user_id)?);
    Ok(months.into_iter().collect())
}
