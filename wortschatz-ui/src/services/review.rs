//! Learning progress engine
//!
//! Records one review event. The per-word write comes first and is fatal on
//! failure; for "known" outcomes the aggregate streak/XP update and badge
//! evaluation follow, and their failures are logged and swallowed so the
//! review itself still reports success. There is no transaction across the
//! two writes.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{error, warn};
use uuid::Uuid;
use wortschatz_common::db::init::get_setting_i64;
use wortschatz_common::db::models::WordStatus;
use wortschatz_common::{Error, Result};

use crate::db::{progress, word_progress};
use crate::services::badges;

/// Review outcome submitted by the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Learning,
    Known,
}

impl ReviewOutcome {
    pub fn parse(s: &str) -> Option<ReviewOutcome> {
        match s {
            "learning" => Some(ReviewOutcome::Learning),
            "known" => Some(ReviewOutcome::Known),
            _ => None,
        }
    }

    fn as_status(self) -> WordStatus {
        match self {
            ReviewOutcome::Learning => WordStatus::Learning,
            ReviewOutcome::Known => WordStatus::Known,
        }
    }
}

/// Record a review event for (user, word)
pub async fn record_review(
    pool: &SqlitePool,
    user_id: Uuid,
    vocabulary_id: Uuid,
    outcome: ReviewOutcome,
) -> Result<()> {
    word_progress::record(pool, user_id, vocabulary_id, outcome.as_status(), Utc::now()).await?;

    if outcome == ReviewOutcome::Known {
        // The review is already recorded; gamification state must not take it
        // back down with it.
        if let Err(err) = apply_known_review(pool, user_id).await {
            error!(
                user_id = %user_id,
                "Aggregate progress update failed: {}", err
            );
        }
    }

    Ok(())
}

/// Apply a "known" outcome to the aggregate progress row
///
/// Read-compute-write under optimistic concurrency: the write is conditional
/// on the version observed at read time, and the whole cycle retries when a
/// concurrent review moved the version on. Every "known" event increments
/// words_learned and grants XP, including repeat reviews of the same word.
async fn apply_known_review(pool: &SqlitePool, user_id: Uuid) -> Result<()> {
    let xp_per_review = get_setting_i64(pool, "xp_per_known_review", 10).await?;
    let max_attempts = get_setting_i64(pool, "progress_update_max_attempts", 5).await?;

    for _ in 0..max_attempts {
        let Some(current) = progress::get_for_user(pool, user_id).await? else {
            // Signup creates the row; a missing one is not worth failing the review over.
            warn!(user_id = %user_id, "No aggregate progress row, skipping update");
            return Ok(());
        };

        let today = Utc::now().date_naive();

        let updated = {
            let mut next = current.clone();
            next.current_streak_days =
                next_streak(current.current_streak_days, current.last_active_date, today);
            next.words_learned += 1;
            next.total_xp += xp_per_review;
            next.last_active_date = Some(today);
            next
        };

        if progress::write_versioned(pool, &updated, current.version).await? {
            if let Err(err) = badges::evaluate_badges(pool, user_id).await {
                warn!(user_id = %user_id, "Badge evaluation failed: {}", err);
            }
            return Ok(());
        }
        // Version conflict: a concurrent review landed between read and write.
    }

    Err(Error::Internal(format!(
        "Aggregate update for {} still conflicting after {} attempts",
        user_id, max_attempts
    )))
}

/// The streak rule
///
/// Same calendar day: unchanged. Exactly one day after the last active date:
/// increment. Any other gap, or no recorded activity: reset to 1.
pub fn next_streak(current: i64, last_active: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match last_active {
        Some(date) if date == today => current,
        Some(date) if date.succ_opt() == Some(today) => current + 1,
        _ => 1,
    }
}
