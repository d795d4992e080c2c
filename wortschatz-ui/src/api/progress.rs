//! Aggregate progress endpoint

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;
use wortschatz_common::db::models::AggregateProgress;

use crate::api::auth::AuthUser;
use crate::db::badges;
use crate::db::progress;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProgressSummary {
    pub words_learned: i64,
    pub total_xp: i64,
    pub current_streak_days: i64,
    pub last_active_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct EarnedBadge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub criteria_type: String,
    pub criteria_value: i64,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: ProgressSummary,
    pub badges: Vec<EarnedBadge>,
}

/// GET /api/progress
///
/// The caller's aggregate progress (zero state when no row exists) plus the
/// earned badges joined with their catalog details.
pub async fn get_progress(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<ProgressResponse>> {
    let aggregate = progress::get_for_user(&state.db, identity.user_id)
        .await?
        .unwrap_or_else(|| AggregateProgress::zero(identity.user_id));

    let earned = badges::earned_with_details(&state.db, identity.user_id).await?;

    Ok(Json(ProgressResponse {
        progress: ProgressSummary {
            words_learned: aggregate.words_learned,
            total_xp: aggregate.total_xp,
            current_streak_days: aggregate.current_streak_days,
            last_active_date: aggregate.last_active_date,
        },
        badges: earned
            .into_iter()
            .map(|(awarded, badge)| EarnedBadge {
                id: badge.id,
                name: badge.name,
                description: badge.description,
                icon: badge.icon,
                criteria_type: badge.criteria_type,
                criteria_value: badge.criteria_value,
                earned_at: awarded.earned_at,
            })
            .collect(),
    }))
}
