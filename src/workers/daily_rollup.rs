//! Nightly rollup of attempt records into per-day activity counters.

use std::collections::HashSet;

use chrono::{Duration, Utc};

use crate::store::Store;

const MS_PER_DAY: i64 = 86_400_000;

/// Full days recomputed on each run.
const ROLLUP_WINDOW_DAYS: i64 = 7;

pub async fn run(store: &Store) {
    tracing::info!("Daily rollup worker running");

    let now = Utc::now();
    let today = now.date_naive();
    let now_ms = now.timestamp_millis();
    // Midnight UTC in unix ms.
    let today_start_ms = now_ms - now_ms.rem_euclid(MS_PER_DAY);

    let mut entries_written = 0u64;

    for offset in 1..=ROLLUP_WINDOW_DAYS {
        let day = today - Duration::days(offset);
        let start_ms = today_start_ms - offset * MS_PER_DAY;
        let end_ms = start_ms + MS_PER_DAY;

        let kids: HashSet<String> = match store.attempt_kids_between(start_ms, end_ms) {
            Ok(kids) => kids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(error = %e, day = %day, "Failed to scan attempt index");
                continue;
            }
        };

        for kid_name in kids {
            let count = match store.count_attempts_between_for_kid(&kid_name, start_ms, end_ms) {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(error = %e, kid = %kid_name, "Failed to count attempts");
                    continue;
                }
            };
            // Overwrite, never increment: re-running a day is a no-op.
            if let Err(e) = store.set_daily_activity(&kid_name, day, count) {
                tracing::warn!(error = %e, kid = %kid_name, "Failed to store daily activity");
                continue;
            }
            entries_written += 1;
        }
    }

    tracing::info!(entries = entries_written, "Daily rollup complete");
}
