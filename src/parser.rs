//! Presence CSV ingestion
//!
//! Reads `user_id,YYYY-MM-DD,HH:MM:SS,HH:MM:SS` rows into a [`PresenceStore`].
//!
//! # Row handling
//!
//! - Rows with a field count other than four are header/footer noise and are
//!   skipped without a log line.
//! - Four-field rows that fail conversion are logged at `debug` with their
//!   line number and skipped. One bad row never aborts the batch.
//! - A later row for the same user and date replaces the earlier one.
//!
//! Only a source that cannot be opened or read is an error.
//!
//! # Example
//!
//! ```
//! use presence_analyzer::parser::parse_records;
//!
//! let csv = "user_id,date,start,end\n10,2013-09-10,09:39:05,17:59:52\n";
//! let (store, stats) = parse_records(csv.as_bytes()).unwrap();
//! assert_eq!(stats.accepted, 1);
//! assert!(store.contains_user(10));
//! ```

use crate::error::{Error, Result};
use crate::model::{Interval, PresenceRecord, PresenceStore, UserId};
use chrono::{NaiveDate, NaiveTime, Timelike};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Number of fields in a data row
pub const FIELDS_PER_ROW: usize = 4;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Why a row was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid user id {0:?}")]
    UserId(String),

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),

    #[error("invalid time {0:?}, expected HH:MM:SS")]
    Time(String),
}

/// Counters for one parse pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Rows seen, including skipped ones
    pub rows_read: u64,
    /// Rows converted into a record
    pub accepted: u64,
    /// Rows skipped for not having exactly four fields
    pub skipped_shape: u64,
    /// Four-field rows whose contents failed conversion
    pub invalid_rows: u64,
    /// Accepted rows that replaced an earlier row for the same user and date
    pub overwritten: u64,
}

/// Convert one four-field row into a record
pub fn parse_row(record: &StringRecord) -> std::result::Result<PresenceRecord, RowError> {
    if record.len() != FIELDS_PER_ROW {
        return Err(RowError::FieldCount(record.len()));
    }
    let user_id = parse_user_id(&record[0])?;
    let date = parse_date(&record[1])?;
    let start = parse_time(&record[2])?;
    let end = parse_time(&record[3])?;

    Ok(PresenceRecord {
        user_id,
        date,
        interval: Interval::new(start, end),
    })
}

fn parse_user_id(field: &str) -> std::result::Result<UserId, RowError> {
    field
        .trim()
        .parse()
        .map_err(|_| RowError::UserId(field.to_string()))
}

fn parse_date(field: &str) -> std::result::Result<NaiveDate, RowError> {
    // chrono skips surrounding whitespace in the input
    if field != field.trim() {
        return Err(RowError::Date(field.to_string()));
    }
    NaiveDate::parse_from_str(field, DATE_FORMAT).map_err(|_| RowError::Date(field.to_string()))
}

fn parse_time(field: &str) -> std::result::Result<NaiveTime, RowError> {
    if field != field.trim() {
        return Err(RowError::Time(field.to_string()));
    }
    let time = NaiveTime::parse_from_str(field, TIME_FORMAT)
        .map_err(|_| RowError::Time(field.to_string()))?;
    // chrono accepts :60 as a leap second
    if time.nanosecond() >= 1_000_000_000 {
        return Err(RowError::Time(field.to_string()));
    }
    Ok(time)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

/// Parse presence rows from any reader
pub fn parse_records<R: Read>(reader: R) -> Result<(PresenceStore, ParseStats)> {
    let mut rows = csv_reader(reader);

    let mut store = PresenceStore::new();
    let mut stats = ParseStats::default();

    for row in rows.records() {
        stats.rows_read += 1;

        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(Error::Csv(err)),
            Err(err) => {
                let line = err.position().map(csv::Position::line);
                tracing::debug!(?line, error = %err, "Problem with line");
                stats.invalid_rows += 1;
                continue;
            }
        };

        if row.len() != FIELDS_PER_ROW {
            stats.skipped_shape += 1;
            continue;
        }

        match parse_row(&row) {
            Ok(record) => {
                stats.accepted += 1;
                if store.insert(record).is_some() {
                    stats.overwritten += 1;
                }
            }
            Err(err) => {
                let line = row.position().map(csv::Position::line);
                tracing::debug!(?line, error = %err, "Problem with line");
                stats.invalid_rows += 1;
            }
        }
    }

    Ok((store, stats))
}

/// Open and parse a presence CSV file
pub fn load_presence_store(path: &Path) -> Result<(PresenceStore, ParseStats)> {
    let file = File::open(path).map_err(|source| Error::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let (store, stats) = parse_records(BufReader::new(file))?;

    tracing::info!(
        path = %path.display(),
        users = store.len(),
        accepted = stats.accepted,
        skipped = stats.skipped_shape,
        invalid = stats.invalid_rows,
        "Loaded presence records"
    );

    Ok((store, stats))
}
