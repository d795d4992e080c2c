//! Vocabulary catalog database operations

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use wortschatz_common::db::models::VocabularyEntry;
use wortschatz_common::Result;

use super::{parse_timestamp, parse_uuid};

fn map_entry(row: &sqlx::sqlite::SqliteRow) -> Result<VocabularyEntry> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");

    Ok(VocabularyEntry {
        id: parse_uuid(&id)?,
        word: row.get("word"),
        meaning: row.get("meaning"),
        example_sentence: row.get("example_sentence"),
        category: row.get("category"),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// List catalog entries, newest first, optionally filtered by category
pub async fn list(pool: &SqlitePool, category: Option<&str>) -> Result<Vec<VocabularyEntry>> {
    let rows = match category {
        Some(category) => {
            sqlx::query(
                "SELECT * FROM vocabulary WHERE category = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(category)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query("SELECT * FROM vocabulary ORDER BY created_at DESC, id DESC")
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(map_entry).collect()
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<VocabularyEntry>> {
    let row = sqlx::query("SELECT * FROM vocabulary WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_entry).transpose()
}

pub async fn create(
    pool: &SqlitePool,
    word: &str,
    meaning: &str,
    example_sentence: &str,
    category: &str,
) -> Result<VocabularyEntry> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO vocabulary (id, word, meaning, example_sentence, category, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(word)
    .bind(meaning)
    .bind(example_sentence)
    .bind(category)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(VocabularyEntry {
        id,
        word: word.to_string(),
        meaning: meaning.to_string(),
        example_sentence: example_sentence.to_string(),
        category: category.to_string(),
        created_at,
    })
}

/// Partial update: only supplied fields change
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    word: Option<&str>,
    meaning: Option<&str>,
    example_sentence: Option<&str>,
    category: Option<&str>,
) -> Result<Option<VocabularyEntry>> {
    sqlx::query(
        r#"
        UPDATE vocabulary
        SET word = COALESCE(?, word),
            meaning = COALESCE(?, meaning),
            example_sentence = COALESCE(?, example_sentence),
            category = COALESCE(?, category)
        WHERE id = ?
        "#,
    )
    .bind(word)
    .bind(meaning)
    .bind(example_sentence)
    .bind(category)
    .bind(id.to_string())
    .execute(pool)
    .await?;

    get(pool, id).await
}

/// Delete an entry; returns whether a row was removed
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM vocabulary WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
