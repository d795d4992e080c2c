//! Bulk vocabulary import endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::services::importer::{
    apply_policy, import_drafts, parse_csv, parse_pipe_text, BatchPolicy, LineError,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// "pipe" for pasted delimited text, "csv" for an uploaded file's contents
    pub format: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub status: String,
    pub imported: usize,
    pub attempted: usize,
    pub errors: Vec<LineError>,
}

/// POST /api/vocabulary/import (admin)
///
/// Pipe input is all-or-nothing; CSV accepts the valid subset. A rejected
/// batch returns 400 with the itemized line errors.
pub async fn bulk_import(
    AdminUser(_identity): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    let text = match req.text {
        Some(ref text) if !text.trim().is_empty() => text,
        _ => return Err(ApiError::BadRequest("Missing required field: text".to_string())),
    };

    let (parsed, policy) = match req.format.as_deref() {
        Some("pipe") | None => (parse_pipe_text(text), BatchPolicy::AllOrNothing),
        Some("csv") => (parse_csv(text), BatchPolicy::Partial),
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown import format '{}' (expected 'pipe' or 'csv')",
                other
            )))
        }
    };

    let (drafts, errors) = parsed;
    let (drafts, errors) = apply_policy(policy, drafts, errors);

    if drafts.is_empty() && !errors.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ImportResponse {
                status: "Import rejected".to_string(),
                imported: 0,
                attempted: 0,
                errors,
            }),
        ));
    }

    let attempted = drafts.len();
    let imported = import_drafts(&state.db, &drafts).await;

    Ok((
        StatusCode::OK,
        Json(ImportResponse {
            status: format!("Imported {} of {} entries", imported, attempted),
            imported,
            attempted,
            errors,
        }),
    ))
}
