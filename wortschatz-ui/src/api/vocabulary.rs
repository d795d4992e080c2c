//! Vocabulary catalog endpoints
//!
//! Reads are public; mutation requires the admin role.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use wortschatz_common::db::models::{is_valid_category, VocabularyEntry, CATEGORIES};

use crate::api::auth::AdminUser;
use crate::db::vocabulary;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub word: Option<String>,
    pub meaning: Option<String>,
    pub example_sentence: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub word: Option<String>,
    pub meaning: Option<String>,
    pub example_sentence: Option<String>,
    pub category: Option<String>,
}

/// GET /api/vocabulary?category=
///
/// Newest first. An unknown category simply matches nothing.
pub async fn list_vocabulary(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<VocabularyEntry>>> {
    let entries = vocabulary::list(&state.db, params.category.as_deref()).await?;
    Ok(Json(entries))
}

/// POST /api/vocabulary (admin)
pub async fn create_vocabulary(
    AdminUser(_identity): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> ApiResult<Json<VocabularyEntry>> {
    let word = required(req.word, "word")?;
    let meaning = required(req.meaning, "meaning")?;
    let category = required(req.category, "category")?;
    validate_category(&category)?;

    let entry = vocabulary::create(
        &state.db,
        &word,
        &meaning,
        req.example_sentence.as_deref().unwrap_or(""),
        &category,
    )
    .await?;

    Ok(Json(entry))
}

/// PUT /api/vocabulary/:id (admin)
///
/// Partial update: only supplied fields change.
pub async fn update_vocabulary(
    AdminUser(_identity): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> ApiResult<Json<VocabularyEntry>> {
    if let Some(category) = req.category.as_deref() {
        validate_category(category)?;
    }

    let entry = vocabulary::update(
        &state.db,
        id,
        req.word.as_deref(),
        req.meaning.as_deref(),
        req.example_sentence.as_deref(),
        req.category.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Vocabulary entry not found: {}", id)))?;

    Ok(Json(entry))
}

/// DELETE /api/vocabulary/:id (admin)
pub async fn delete_vocabulary(
    AdminUser(_identity): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let removed = vocabulary::delete(&state.db, id).await?;
    if !removed {
        return Err(ApiError::NotFound(format!("Vocabulary entry not found: {}", id)));
    }

    Ok(Json(json!({ "success": true })))
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("Missing required field: {}", field))),
    }
}

fn validate_category(category: &str) -> Result<(), ApiError> {
    if is_valid_category(category) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Unknown category '{}' (expected one of: {})",
            category,
            CATEGORIES.join(", ")
        )))
    }
}
