use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::constants::{STATS_ACTIVITY_DAYS, STATS_RECENT_SESSIONS};
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::operations::attempts::AttemptRecord;
use crate::store::Store;
use crate::validation::validate_kid_name;

const MS_PER_DAY: i64 = 86_400_000;

pub fn router() -> Router<AppState> {
    Router::new().route("/:kid_name", get(get_stats))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SoundStats {
    total: u64,
    success: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DayActivity {
    date: String,
    count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsView {
    total: u64,
    successes: u64,
    near_misses: u64,
    /// Whole percent, 0 when the kid has no attempts.
    success_rate: u8,
    total_stars: u64,
    best_streak: u32,
    sound_breakdown: BTreeMap<String, SoundStats>,
    daily_activity: Vec<DayActivity>,
    recent_sessions: Vec<AttemptRecord>,
}

/// GET /:kidName — the parent dashboard summary.
async fn get_stats(
    State(state): State<AppState>,
    Path(kid_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(msg) = validate_kid_name(&kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }

    let progress = state.engine().load_or_init_state(&kid_name)?;

    let success_rate = if progress.total_attempts == 0 {
        0
    } else {
        ((progress.total_successes as f64 / progress.total_attempts as f64) * 100.0).round() as u8
    };

    let sound_breakdown = progress
        .sound_attempts
        .iter()
        .map(|(sound, total)| {
            let success = progress.sound_successes.get(sound).copied().unwrap_or(0);
            (
                sound.clone(),
                SoundStats {
                    total: *total,
                    success,
                },
            )
        })
        .collect();

    let daily_activity = daily_activity_last_week(state.store(), &kid_name)?;
    let recent_sessions = state
        .store()
        .attempts_for_kid(&kid_name, STATS_RECENT_SESSIONS)?;

    Ok(ok(StatsView {
        total: progress.total_attempts,
        successes: progress.total_successes,
        near_misses: progress.total_near_misses,
        success_rate,
        total_stars: progress.total_stars,
        best_streak: progress.best_streak,
        sound_breakdown,
        daily_activity,
        recent_sessions,
    }))
}

/// Seven days of activity, oldest first. Prior days come from the
/// rollup tree; today is counted live from the attempt time index
/// because the rollup only covers completed days.
fn daily_activity_last_week(store: &Store, kid_name: &str) -> Result<Vec<DayActivity>, AppError> {
    let now = Utc::now();
    let today = now.date_naive();
    let now_ms = now.timestamp_millis();
    // Midnight UTC in unix ms.
    let today_start_ms = now_ms - now_ms.rem_euclid(MS_PER_DAY);

    let mut days = Vec::with_capacity(STATS_ACTIVITY_DAYS as usize);
    for offset in (1..STATS_ACTIVITY_DAYS).rev() {
        let day = today - Duration::days(offset);
        let count = store.get_daily_activity(kid_name, day)?;
        days.push(DayActivity {
            date: day.format("%Y-%m-%d").to_string(),
            count,
        });
    }

    let today_count = store.count_attempts_between_for_kid(kid_name, today_start_ms, now_ms + 1)?;
    days.push(DayActivity {
        date: today.format("%Y-%m-%d").to_string(),
        count: today_count,
    });

    Ok(days)
}
