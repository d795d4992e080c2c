//! Aggregate progress database operations
//!
//! The read-compute-write cycle of the streak update is guarded by the
//! `version` column: the write only lands when the row is unchanged since the
//! read, and the caller retries on conflict.

use chrono::{NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use wortschatz_common::db::models::AggregateProgress;
use wortschatz_common::{Error, Result};

use super::parse_uuid;

fn map_progress(row: &sqlx::sqlite::SqliteRow) -> Result<AggregateProgress> {
    let user_id: String = row.get("user_id");
    let last_active_date: Option<String> = row.get("last_active_date");

    Ok(AggregateProgress {
        user_id: parse_uuid(&user_id)?,
        words_learned: row.get("words_learned"),
        total_xp: row.get("total_xp"),
        current_streak_days: row.get("current_streak_days"),
        last_active_date: last_active_date
            .map(|d| {
                d.parse::<NaiveDate>()
                    .map_err(|e| Error::Internal(format!("Failed to parse date '{}': {}", d, e)))
            })
            .transpose()?,
        version: row.get("version"),
    })
}

pub async fn get_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Option<AggregateProgress>> {
    let row = sqlx::query("SELECT * FROM user_progress WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_progress).transpose()
}

/// Version-guarded write of the aggregate counters
///
/// Returns false when another writer got there first (version moved on); the
/// caller re-reads and recomputes.
pub async fn write_versioned(
    pool: &SqlitePool,
    updated: &AggregateProgress,
    expected_version: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE user_progress
        SET words_learned = ?,
            total_xp = ?,
            current_streak_days = ?,
            last_active_date = ?,
            version = version + 1,
            updated_at = ?
        WHERE user_id = ? AND version = ?
        "#,
    )
    .bind(updated.words_learned)
    .bind(updated.total_xp)
    .bind(updated.current_streak_days)
    .bind(updated.last_active_date.map(|d| d.to_string()))
    .bind(Utc::now().to_rfc3339())
    .bind(updated.user_id.to_string())
    .bind(expected_version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
