//! Badge evaluation
//!
//! Awards every catalog badge whose threshold the user's aggregate progress
//! has crossed. Idempotent: already-earned badges are skipped up front, and
//! the (user, badge) uniqueness constraint turns a concurrent duplicate into
//! a no-op.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use wortschatz_common::Result;

use crate::db::{badges, progress};

/// Evaluate all badges for a user, returning the newly awarded badge ids
pub async fn evaluate_badges(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Uuid>> {
    let Some(aggregate) = progress::get_for_user(pool, user_id).await? else {
        return Ok(Vec::new());
    };

    let catalog = badges::list_all(pool).await?;
    let earned = badges::earned_ids(pool, user_id).await?;
    let now = Utc::now();

    let mut newly_awarded = Vec::new();
    for badge in catalog {
        if earned.contains(&badge.id) {
            continue;
        }

        let eligible = match badge.criteria_type.as_str() {
            "words_learned" => aggregate.words_learned >= badge.criteria_value,
            "streak_days" => aggregate.current_streak_days >= badge.criteria_value,
            // Unknown criteria: never eligible
            _ => false,
        };
        if !eligible {
            continue;
        }

        // Each award is an independent write; partial success is acceptable.
        match badges::award(pool, user_id, badge.id, now).await {
            Ok(true) => {
                info!(user_id = %user_id, badge = %badge.name, "Badge awarded");
                newly_awarded.push(badge.id);
            }
            Ok(false) => {} // lost a race to a concurrent evaluation; fine
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    badge = %badge.name,
                    "Failed to award badge: {}", err
                );
            }
        }
    }

    Ok(newly_awarded)
}
