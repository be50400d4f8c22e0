use chrono::{DateTime, Utc};

use speech_practice_backend::engine::leveling;
use speech_practice_backend::engine::types::ProgressState;
use speech_practice_backend::store::operations::attempts::AttemptRecord;
use speech_practice_backend::store::Store;

/// Store a profile with the given XP, as if earned earlier.
pub fn seed_progress(store: &Store, kid_name: &str, total_xp: u64) -> ProgressState {
    let mut state = ProgressState::named(kid_name);
    state.total_xp = total_xp;
    state.level = leveling::level_for_xp(total_xp);
    store.put_progress(&state).expect("seed progress");
    state
}

/// Store one historical attempt record directly, without running the
/// engine pipeline.
pub fn seed_attempt(
    store: &Store,
    state: &ProgressState,
    word: &str,
    sound: &str,
    success: bool,
    created_at: DateTime<Utc>,
) -> AttemptRecord {
    let record = AttemptRecord {
        id: uuid::Uuid::new_v4().to_string(),
        kid_name: state.kid_name.clone(),
        buddy: state.selected_buddy.clone(),
        sound: sound.to_string(),
        word: word.to_string(),
        attempts: 1,
        success,
        transcript: word.to_lowercase(),
        is_near_miss: false,
        xp_earned: if success { 30 } else { 0 },
        created_at,
    };
    store
        .record_attempt(&record, state, &[])
        .expect("seed attempt");
    record
}
