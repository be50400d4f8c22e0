use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::types::{LevelProgress, ProgressState};
use crate::engine::{badges, leveling};
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::{validate_buddy, validate_kid_name};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:kid_name", get(get_progress))
        .route("/:kid_name/buddy", post(set_buddy))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BadgeStatus {
    id: &'static str,
    name: &'static str,
    emoji: &'static str,
    description: &'static str,
    earned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    earned_at: Option<DateTime<Utc>>,
}

/// Full progression snapshot plus derived fields the client renders
/// directly (level bar, next speech rate, badge wall).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProgressView {
    #[serde(flatten)]
    state: ProgressState,
    level_progress: LevelProgress,
    speech_rate: f64,
    badges: Vec<BadgeStatus>,
}

pub(super) fn progress_view(state: &ProgressState) -> ProgressView {
    let badges = badges::catalog()
        .iter()
        .map(|def| BadgeStatus {
            id: def.id,
            name: def.name,
            emoji: def.emoji,
            description: def.description,
            earned: state.earned_badges.contains_key(def.id),
            earned_at: state.earned_badges.get(def.id).copied(),
        })
        .collect();

    ProgressView {
        level_progress: leveling::progress_within_level(state.total_xp),
        speech_rate: state.speech_rate(),
        badges,
        state: state.clone(),
    }
}

/// GET /:kidName — progression snapshot. Unknown kids get a fresh
/// default so the client can render before the first attempt.
async fn get_progress(
    State(state): State<AppState>,
    Path(kid_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }

    let progress = state.engine().load_or_init_state(&kid_name)?;
    Ok(ok(progress_view(&progress)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetBuddyRequest {
    buddy: String,
}

/// POST /:kidName/buddy — pick the speech buddy.
async fn set_buddy(
    State(state): State<AppState>,
    Path(kid_name): Path<String>,
    JsonBody(req): JsonBody<SetBuddyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }
    if let Err(msg) = validate_buddy(&req.buddy) {
        return Err(AppError::unprocessable("INVALID_BUDDY", msg));
    }

    let progress = state.engine().set_buddy(&kid_name, &req.buddy).await?;
    Ok(ok(progress_view(&progress)))
}
