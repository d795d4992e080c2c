//! User account database operations

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use wortschatz_common::db::models::User;
use wortschatz_common::{Error, Result};

use super::{parse_timestamp, parse_uuid};

fn map_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let reset_code_expires_at: Option<String> = row.get("reset_code_expires_at");

    Ok(User {
        id: parse_uuid(&id)?,
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
        is_admin: row.get::<i64, _>("is_admin") != 0,
        reset_code: row.get("reset_code"),
        reset_code_expires_at: reset_code_expires_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Create a user together with the zeroed progress row
///
/// The progress row starts with all-zero counters and last_active_date set to
/// the signup date. A duplicate email surfaces as a Conflict.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    password_hash: &str,
    password_salt: &str,
) -> Result<User> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, password_salt, is_admin, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(password_salt)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await;

    if let Err(err) = inserted {
        if is_unique_violation(&err) {
            return Err(Error::Conflict(format!("User already exists: {}", email)));
        }
        return Err(err.into());
    }

    sqlx::query(
        r#"
        INSERT INTO user_progress (user_id, words_learned, total_xp, current_streak_days, last_active_date, version)
        VALUES (?, 0, 0, 0, ?, 0)
        "#,
    )
    .bind(id.to_string())
    .bind(created_at.date_naive().to_string())
    .execute(pool)
    .await?;

    Ok(User {
        id,
        email: email.to_string(),
        name: name.to_string(),
        password_hash: password_hash.to_string(),
        password_salt: password_salt.to_string(),
        is_admin: false,
        reset_code: None,
        reset_code_expires_at: None,
        created_at,
    })
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_user).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_user).transpose()
}

/// Store a password reset code with its expiry
pub async fn set_reset_code(
    pool: &SqlitePool,
    user_id: Uuid,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE users SET reset_code = ?, reset_code_expires_at = ? WHERE id = ?")
        .bind(code)
        .bind(expires_at.to_rfc3339())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Update the password digest and invalidate the reset code
pub async fn update_password(
    pool: &SqlitePool,
    user_id: Uuid,
    password_hash: &str,
    password_salt: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = ?, password_salt = ?, reset_code = NULL, reset_code_expires_at = NULL
        WHERE id = ?
        "#,
    )
    .bind(password_hash)
    .bind(password_salt)
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
