use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::constants::{DEFAULT_PAGE_SIZE_ATTEMPTS, MAX_PAGE_SIZE};
use crate::engine::AttemptSubmission;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::{validate_buddy, validate_kid_name, validate_transcript};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_attempts).post(submit_attempt))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAttemptRequest {
    kid_name: String,
    buddy: Option<String>,
    mission_id: u32,
    /// Missing or empty transcript is a valid submission (silence).
    #[serde(default)]
    transcript: String,
}

/// POST / — score one speech attempt and apply its progression.
async fn submit_attempt(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&req.kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }
    if let Some(buddy) = &req.buddy {
        if let Err(msg) = validate_buddy(buddy) {
            return Err(AppError::unprocessable("INVALID_BUDDY", msg));
        }
    }
    if let Err(msg) = validate_transcript(&req.transcript) {
        return Err(AppError::unprocessable("INVALID_TRANSCRIPT", msg));
    }

    let scored = state
        .engine()
        .process_attempt(AttemptSubmission {
            kid_name: req.kid_name,
            buddy: req.buddy,
            mission_id: req.mission_id,
            transcript: req.transcript,
        })
        .await?;

    Ok(ok(scored))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    kid_name: String,
    limit: Option<u64>,
}

impl ListQuery {
    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE_ATTEMPTS)
            .clamp(1, MAX_PAGE_SIZE) as usize
    }
}

/// GET /?kidName=&limit= — newest-first attempt records.
async fn list_attempts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&query.kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }

    let attempts = state
        .store()
        .attempts_for_kid(&query.kid_name, query.limit())?;
    let total = state.store().count_attempts_for_kid(&query.kid_name)?;

    Ok(ok(serde_json::json!({
        "attempts": attempts,
        "total": total,
    })))
}
