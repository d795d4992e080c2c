//! Badge catalog and award database operations

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;
use wortschatz_common::db::models::{AwardedBadge, Badge};
use wortschatz_common::Result;

use super::{parse_timestamp, parse_uuid};

fn map_badge(row: &sqlx::sqlite::SqliteRow) -> Result<Badge> {
    let id: String = row.get("id");

    Ok(Badge {
        id: parse_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        icon: row.get("icon"),
        criteria_type: row.get("criteria_type"),
        criteria_value: row.get("criteria_value"),
    })
}

/// The full badge catalog
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Badge>> {
    let rows = sqlx::query("SELECT * FROM badges").fetch_all(pool).await?;
    rows.iter().map(map_badge).collect()
}

/// Ids of badges already earned by a user
pub async fn earned_ids(pool: &SqlitePool, user_id: Uuid) -> Result<HashSet<Uuid>> {
    let rows = sqlx::query("SELECT badge_id FROM user_badges WHERE user_id = ?")
        .bind(user_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let id: String = row.get("badge_id");
            parse_uuid(&id)
        })
        .collect()
}

/// Award a badge to a user
///
/// `INSERT OR IGNORE`: a concurrent or repeated award hits the
/// (user_id, badge_id) uniqueness constraint and is a benign no-op.
/// Returns whether a row was actually inserted.
pub async fn award(
    pool: &SqlitePool,
    user_id: Uuid,
    badge_id: Uuid,
    earned_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO user_badges (user_id, badge_id, earned_at) VALUES (?, ?, ?)",
    )
    .bind(user_id.to_string())
    .bind(badge_id.to_string())
    .bind(earned_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Earned badges joined with their catalog details, newest first
pub async fn earned_with_details(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<(AwardedBadge, Badge)>> {
    let rows = sqlx::query(
        r#"
        SELECT ub.user_id, ub.badge_id, ub.earned_at,
               b.id, b.name, b.description, b.icon, b.criteria_type, b.criteria_value
        FROM user_badges ub
        JOIN badges b ON b.id = ub.badge_id
        WHERE ub.user_id = ?
        ORDER BY ub.earned_at DESC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let user_id: String = row.get("user_id");
            let badge_id: String = row.get("badge_id");
            let earned_at: String = row.get("earned_at");

            let awarded = AwardedBadge {
                user_id: parse_uuid(&user_id)?,
                badge_id: parse_uuid(&badge_id)?,
                earned_at: parse_timestamp(&earned_at)?,
            };
            Ok((awarded, map_badge(row)?))
        })
        .collect()
}
