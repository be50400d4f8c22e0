use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::content::{self, Chapter, Mission};
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::validate_kid_name;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chapters", get(list_chapters))
        .route("/missions/:id", get(get_mission))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChaptersQuery {
    kid_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChapterView {
    #[serde(flatten)]
    chapter: &'static Chapter,
    locked: bool,
    missions: Vec<&'static Mission>,
}

/// GET /chapters?kidName= — the catalog as the mission map renders it.
/// Without a kid (or for a kid that has never played) everything above
/// the starter chapter is locked.
async fn list_chapters(
    State(state): State<AppState>,
    Query(query): Query<ChaptersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let total_xp = match &query.kid_name {
        Some(kid_name) => {
            if let Err(msg) = validate_kid_name(kid_name) {
                return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
            }
            state
                .store()
                .get_progress(kid_name)?
                .map(|p| p.total_xp)
                .unwrap_or(0)
        }
        None => 0,
    };

    let chapters: Vec<ChapterView> = content::chapters()
        .iter()
        .map(|chapter| ChapterView {
            locked: !content::is_chapter_unlocked(chapter, total_xp),
            missions: chapter
                .mission_ids
                .iter()
                .filter_map(|id| content::mission(*id))
                .collect(),
            chapter,
        })
        .collect();

    Ok(ok(serde_json::json!({
        "chapters": chapters,
        "currentChapterId": content::current_chapter(total_xp).id,
        "totalXp": total_xp,
    })))
}

/// GET /missions/:id — one mission with its chapter.
async fn get_mission(Path(id): Path<u32>) -> Result<impl IntoResponse, AppError> {
    let Some(mission) = content::mission(id) else {
        return Err(AppError::not_found(&format!("Unknown mission: {id}")));
    };

    Ok(ok(serde_json::json!({
        "mission": mission,
        "chapterId": content::chapter_of(id).map(|c| c.id),
    })))
}
