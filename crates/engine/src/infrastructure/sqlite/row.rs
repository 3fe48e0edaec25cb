//! Column decoding helpers shared by the SQLite repositories.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::infrastructure::ports::RepoError;

pub(super) fn text(row: &SqliteRow, column: &str) -> Result<String, RepoError> {
    row.try_get::<String, _>(column)
        .map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))
}

pub(super) fn opt_text(row: &SqliteRow, column: &str) -> Result<Option<String>, RepoError> {
    row.try_get::<Option<String>, _>(column)
        .map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))
}

pub(super) fn parsed<T>(row: &SqliteRow, column: &str) -> Result<T, RepoError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = text(row, column)?;
    raw.parse::<T>()
        .map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))
}

pub(super) fn count(row: &SqliteRow, column: &str) -> Result<u32, RepoError> {
    let raw = row
        .try_get::<i64, _>(column)
        .map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))?;
    u32::try_from(raw).map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))
}

pub(super) fn opt_count(row: &SqliteRow, column: &str) -> Result<Option<u32>, RepoError> {
    let raw = row
        .try_get::<Option<i64>, _>(column)
        .map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))?;
    raw.map(|v| {
        u32::try_from(v).map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))
    })
    .transpose()
}

pub(super) fn flag(row: &SqliteRow, column: &str) -> Result<bool, RepoError> {
    row.try_get::<bool, _>(column)
        .map_err(|e| RepoError::serialization(format!("column {}: {}", column, e)))
}

pub(super) fn timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, RepoError> {
    parse_timestamp(&text(row, column)?)
}

pub(super) fn opt_timestamp(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, RepoError> {
    opt_text(row, column)?
        .map(|raw| parse_timestamp(&raw))
        .transpose()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("timestamp {}: {}", raw, e)))
}

/// Fixed-width UTC timestamps so lexical order matches chronological order.
pub(super) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
