//! Database initialization
//!
//! Creates the schema idempotently on startup and applies default settings.
//! The database file is created automatically on first run.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection, create tables and defaults if needed
///
/// Connection options apply per pooled connection: foreign keys on, WAL
/// journal (concurrent readers with one writer), bounded busy timeout.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Connect to an in-memory database with the schema and default settings
///
/// A single connection is used so every query sees the same database.
/// Integration tests build their router state on top of this.
pub async fn init_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_users_table(pool).await?;
    create_vocabulary_table(pool).await?;
    create_user_progress_table(pool).await?;
    create_user_vocabulary_progress_table(pool).await?;
    create_badges_table(pool).await?;
    create_user_badges_table(pool).await?;

    Ok(())
}

/// Create the settings table
///
/// Stores the credential signing secret and runtime tunables.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0,
            reset_code TEXT,
            reset_code_expires_at TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_vocabulary_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vocabulary (
            id TEXT PRIMARY KEY,
            word TEXT NOT NULL,
            meaning TEXT NOT NULL,
            example_sentence TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_vocabulary_category ON vocabulary(category)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_vocabulary_created_at ON vocabulary(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_user_progress_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_progress (
            user_id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            words_learned INTEGER NOT NULL DEFAULT 0,
            total_xp INTEGER NOT NULL DEFAULT 0,
            current_streak_days INTEGER NOT NULL DEFAULT 0,
            last_active_date TEXT,
            version INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (words_learned >= 0),
            CHECK (total_xp >= 0),
            CHECK (current_streak_days >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_user_vocabulary_progress_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_vocabulary_progress (
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            vocabulary_id TEXT NOT NULL REFERENCES vocabulary(id) ON DELETE CASCADE,
            status TEXT NOT NULL CHECK (status IN ('new', 'learning', 'known')),
            times_reviewed INTEGER NOT NULL DEFAULT 0,
            last_reviewed TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (user_id, vocabulary_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_user_vocab_progress_user ON user_vocabulary_progress(user_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_badges_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS badges (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL,
            criteria_type TEXT NOT NULL,
            criteria_value INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (criteria_value > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_user_badges_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_badges (
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            badge_id TEXT NOT NULL REFERENCES badges(id) ON DELETE CASCADE,
            earned_at TEXT NOT NULL,
            PRIMARY KEY (user_id, badge_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_badges_user ON user_badges(user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Ensures all required settings exist; NULL values are reset to defaults.
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // Credential settings
    ensure_setting(pool, "auth_token_ttl_seconds", "604800").await?; // 7 days
    ensure_setting(pool, "reset_code_ttl_seconds", "3600").await?; // 1 hour
    ensure_setting(pool, "min_password_length", "6").await?;

    // Learning progress settings
    ensure_setting(pool, "xp_per_known_review", "10").await?;
    ensure_setting(pool, "progress_update_max_attempts", "5").await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // Use INSERT OR IGNORE to handle concurrent initialization races
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Read an integer setting, falling back to a default when absent or invalid
pub async fn get_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?
        .flatten();

    Ok(value.and_then(|v| v.parse::<i64>().ok()).unwrap_or(default))
}
