use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::routes::progress::progress_view;
use crate::state::AppState;
use crate::validation::validate_kid_name;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/start", post(start_mission))
        .route("/abandon", post(abandon_mission))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartMissionRequest {
    kid_name: String,
}

/// POST /:id/start — open a fresh run at a mission. Replacing a live
/// run at a different mission finalizes that run as a failure first.
async fn start_mission(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    JsonBody(req): JsonBody<StartMissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&req.kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }

    let progress = state.engine().start_mission(&req.kid_name, id).await?;
    Ok(created(progress_view(&progress)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AbandonMissionRequest {
    kid_name: String,
}

/// POST /abandon — finalize the active run, if any, as a failure.
async fn abandon_mission(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AbandonMissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&req.kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }

    let progress = state.engine().abandon_mission(&req.kid_name).await?;
    Ok(ok(progress_view(&progress)))
}
