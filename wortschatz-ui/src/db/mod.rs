//! Database access layer for wortschatz-ui
//!
//! One module per entity, mirroring the table layout. Uuids and timestamps
//! are stored as TEXT; the helpers below centralize parsing on the way out.

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;
use wortschatz_common::{Error, Result};

pub mod badges;
pub mod progress;
pub mod users;
pub mod vocabulary;
pub mod word_progress;

/// Parse a TEXT uuid column
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Failed to parse uuid: {}", e)))
}

/// Parse a TEXT timestamp column
///
/// Accepts RFC 3339 (written by our code) and the `YYYY-MM-DD HH:MM:SS`
/// form produced by SQLite's CURRENT_TIMESTAMP default.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp '{}': {}", value, e)))
}
