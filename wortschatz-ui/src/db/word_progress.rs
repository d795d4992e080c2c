//! Per-(user, word) review state operations
//!
//! The (user_id, vocabulary_id) pair is unique; reviews are recorded with a
//! single upsert so the row is created lazily and never duplicated.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use wortschatz_common::db::models::{WordProgress, WordStatus};
use wortschatz_common::{Error, Result};

use super::{parse_timestamp, parse_uuid};

fn map_progress(row: &sqlx::sqlite::SqliteRow) -> Result<WordProgress> {
    let user_id: String = row.get("user_id");
    let vocabulary_id: String = row.get("vocabulary_id");
    let status: String = row.get("status");
    let last_reviewed: Option<String> = row.get("last_reviewed");

    Ok(WordProgress {
        user_id: parse_uuid(&user_id)?,
        vocabulary_id: parse_uuid(&vocabulary_id)?,
        status: WordStatus::parse(&status)
            .ok_or_else(|| Error::Internal(format!("Unknown word status: {}", status)))?,
        times_reviewed: row.get("times_reviewed"),
        last_reviewed: last_reviewed.as_deref().map(parse_timestamp).transpose()?,
    })
}

/// Record a review: insert on first sight, otherwise bump the counter and
/// overwrite status and timestamp
pub async fn record(
    pool: &SqlitePool,
    user_id: Uuid,
    vocabulary_id: Uuid,
    status: WordStatus,
    reviewed_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_vocabulary_progress (user_id, vocabulary_id, status, times_reviewed, last_reviewed)
        VALUES (?, ?, ?, 1, ?)
        ON CONFLICT(user_id, vocabulary_id) DO UPDATE SET
            status = excluded.status,
            last_reviewed = excluded.last_reviewed,
            times_reviewed = user_vocabulary_progress.times_reviewed + 1
        "#,
    )
    .bind(user_id.to_string())
    .bind(vocabulary_id.to_string())
    .bind(status.as_str())
    .bind(reviewed_at.to_rfc3339())
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(err) if is_foreign_key_violation(&err) => Err(Error::InvalidInput(format!(
            "Unknown vocabulary entry: {}",
            vocabulary_id
        ))),
        Err(err) => Err(err.into()),
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}

pub async fn get(
    pool: &SqlitePool,
    user_id: Uuid,
    vocabulary_id: Uuid,
) -> Result<Option<WordProgress>> {
    let row = sqlx::query(
        "SELECT * FROM user_vocabulary_progress WHERE user_id = ? AND vocabulary_id = ?",
    )
    .bind(user_id.to_string())
    .bind(vocabulary_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_progress).transpose()
}

/// All per-word rows for a user (merged with the catalog by the flashcards view)
pub async fn list_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<WordProgress>> {
    let rows = sqlx::query("SELECT * FROM user_vocabulary_progress WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(map_progress).collect()
}
