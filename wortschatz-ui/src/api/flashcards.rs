//! Flashcard endpoints: the study view and review submission

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;
use wortschatz_common::db::models::WordStatus;

use crate::api::auth::AuthUser;
use crate::db::{vocabulary, word_progress};
use crate::error::{ApiError, ApiResult};
use crate::services::{record_review, ReviewOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FlashcardParams {
    pub category: Option<String>,
}

/// A catalog entry joined with the caller's review state
#[derive(Debug, Serialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub word: String,
    pub meaning: String,
    pub example_sentence: String,
    pub category: String,
    pub user_status: WordStatus,
    pub times_reviewed: i64,
    pub last_reviewed: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub vocabulary_id: Option<String>,
    pub status: Option<String>,
}

/// GET /api/flashcards?category=
///
/// The full catalog (optionally filtered) with the caller's per-word state
/// merged in; unreviewed words show as "new".
pub async fn get_flashcards(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(params): Query<FlashcardParams>,
) -> ApiResult<Json<Vec<Flashcard>>> {
    let entries = vocabulary::list(&state.db, params.category.as_deref()).await?;
    let progress = word_progress::list_for_user(&state.db, identity.user_id).await?;

    let by_word: HashMap<Uuid, _> = progress
        .into_iter()
        .map(|p| (p.vocabulary_id, p))
        .collect();

    let flashcards = entries
        .into_iter()
        .map(|entry| {
            let word_state = by_word.get(&entry.id);
            Flashcard {
                id: entry.id,
                word: entry.word,
                meaning: entry.meaning,
                example_sentence: entry.example_sentence,
                category: entry.category,
                user_status: word_state.map(|p| p.status).unwrap_or(WordStatus::New),
                times_reviewed: word_state.map(|p| p.times_reviewed).unwrap_or(0),
                last_reviewed: word_state.and_then(|p| p.last_reviewed),
            }
        })
        .collect();

    Ok(Json(flashcards))
}

/// POST /api/flashcards/progress
///
/// Submit one review event: {vocabulary_id, status ∈ learning|known}.
pub async fn submit_review(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(req): Json<ReviewRequest>,
) -> ApiResult<Json<Value>> {
    let vocabulary_id = req
        .vocabulary_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Missing required field: vocabulary_id".to_string()))?;
    let vocabulary_id = Uuid::parse_str(vocabulary_id)
        .map_err(|_| ApiError::BadRequest("Invalid vocabulary_id".to_string()))?;

    let status = req
        .status
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Missing required field: status".to_string()))?;
    let outcome = ReviewOutcome::parse(status).ok_or_else(|| {
        ApiError::BadRequest("status must be 'learning' or 'known'".to_string())
    })?;

    record_review(&state.db, identity.user_id, vocabulary_id, outcome).await?;

    Ok(Json(json!({ "success": true })))
}
