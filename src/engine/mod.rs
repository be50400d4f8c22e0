pub mod badges;
pub mod config;
pub mod evaluator;
pub mod feedback;
pub mod ledger;
pub mod leveling;
pub mod mission;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

use crate::content;
use crate::engine::config::EngineConfig;
use crate::engine::types::{Outcome, ProgressEvent, ProgressState, ScoredAttempt};
use crate::response::AppError;
use crate::store::operations::attempts::AttemptRecord;
use crate::store::operations::events::ProgressEventRecord;
use crate::store::{Store, StoreError};

/// One incoming attempt, as submitted by the client.
#[derive(Debug, Clone)]
pub struct AttemptSubmission {
    pub kid_name: String,
    pub buddy: Option<String>,
    pub mission_id: u32,
    pub transcript: String,
}

pub struct ProgressEngine {
    config: Arc<RwLock<EngineConfig>>,
    store: Arc<Store>,
    kid_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    rng: Mutex<StdRng>,
    events_tx: broadcast::Sender<ProgressEventRecord>,
}

impl ProgressEngine {
    pub fn new(config: EngineConfig, store: Arc<Store>) -> Self {
        Self::with_seed(config, store, None)
    }

    /// A fixed seed makes the feedback draws deterministic, for tests.
    pub fn with_seed(config: EngineConfig, store: Arc<Store>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (events_tx, _) = broadcast::channel(256);
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            kid_locks: Arc::new(Mutex::new(HashMap::new())),
            rng: Mutex::new(rng),
            events_tx,
        }
    }

    pub async fn reload_config(&self, new_config: EngineConfig) -> Result<(), String> {
        new_config.validate()?;
        let mut cfg = self.config.write().await;
        *cfg = new_config;
        tracing::info!("Engine config reloaded");
        Ok(())
    }

    pub async fn get_config(&self) -> EngineConfig {
        self.config.read().await.clone()
    }

    /// Live progress events, for the SSE feed.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ProgressEventRecord> {
        self.events_tx.subscribe()
    }

    async fn acquire_kid_lock(&self, kid_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.kid_locks.lock().await;

        // Periodically prune entries that are no longer held by anyone.
        // Arc::strong_count == 1 means only the HashMap holds a reference,
        // so the lock is idle and can be safely removed.
        if locks.len() > 1000 {
            locks.retain(|_, v| Arc::strong_count(v) > 1);
        }

        locks
            .entry(kid_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Score one attempt end to end: resolve the mission, evaluate the
    /// transcript, apply XP and streak, advance the mission instance,
    /// grant badges, compose feedback and persist everything in one
    /// transaction. Attempts for the same kid are serialized.
    pub async fn process_attempt(
        &self,
        submission: AttemptSubmission,
    ) -> Result<ScoredAttempt, AppError> {
        let kid_lock = self.acquire_kid_lock(&submission.kid_name).await;
        let _guard = kid_lock.lock().await;

        let config = self.config.read().await.clone();

        let mission = content::mission(submission.mission_id).ok_or_else(|| {
            AppError::not_found(&format!("Unknown mission: {}", submission.mission_id))
        })?;

        let mut state = self.load_or_init_state(&submission.kid_name)?;

        if let Some(buddy) = &submission.buddy {
            state.selected_buddy = buddy.clone();
        }

        if !content::is_mission_unlocked(mission.id, state.total_xp) {
            return Err(AppError::forbidden(
                "MISSION_LOCKED",
                &format!("Mission '{}' is still locked", mission.word),
            ));
        }

        // Switching missions mid-run finalizes the previous instance
        // (streak reset if it had attempts and no success).
        mission::ensure_active(&mut state, mission.id, &config);
        let Some(instance) = state.active_mission.as_mut() else {
            return Err(AppError::internal("mission instance missing after ensure_active"));
        };
        let attempt_number = mission::begin_attempt(instance);

        let evaluation = evaluator::evaluate(&submission.transcript, mission.word, mission.sound);

        let mut events: Vec<ProgressEvent> = Vec::new();
        let delta = ledger::apply_attempt(
            &mut state,
            evaluation.outcome,
            attempt_number,
            mission.word,
            mission.sound,
            &config,
            &mut events,
        );

        let completed = evaluation.outcome.is_success();
        let stars = if completed {
            Some(ledger::stars_for_attempts(attempt_number))
        } else {
            None
        };
        if let Some(stars) = stars {
            ledger::finalize_completed_instance(&mut state, mission.id, stars);
            state.active_mission = None;
        } else if let Some(instance) = state.active_mission.as_mut() {
            mission::register_non_success(instance, evaluation.outcome, &config);
        }

        let show_hint = state
            .active_mission
            .as_ref()
            .map(|i| i.hint_shown)
            .unwrap_or(false);
        let speech_rate = state.speech_rate();

        let counters =
            badges::BadgeCounters::from_state(&state, content::distinct_sound_count());
        let newly_earned =
            badges::evaluate_badges(&counters, |id| state.earned_badges.contains_key(id));
        let now = Utc::now();
        let mut badges_earned = Vec::with_capacity(newly_earned.len());
        for def in newly_earned {
            state.earned_badges.insert(def.id.to_string(), now);
            events.push(ProgressEvent::BadgeEarned {
                badge_id: def.id.to_string(),
            });
            badges_earned.push(def.id.to_string());
        }

        let feedback = {
            let mut rng = self.rng.lock().await;
            let ctx = feedback::FeedbackContext {
                outcome: evaluation.outcome,
                attempt_number,
                leveled_up: delta.leveled_up(),
                buddy: &state.selected_buddy,
                word: mission.word,
                sound: mission.sound,
                tip: mission.tip,
                example: mission.example,
            };
            feedback::attempt_feedback(&ctx, &config, &mut *rng)
        };

        state.updated_at = now;

        let event_records: Vec<ProgressEventRecord> = events
            .into_iter()
            .map(|event| ProgressEventRecord::new(&submission.kid_name, event))
            .collect();

        let record = AttemptRecord {
            id: Uuid::new_v4().to_string(),
            kid_name: state.kid_name.clone(),
            buddy: state.selected_buddy.clone(),
            sound: mission.sound.to_string(),
            word: mission.word.to_string(),
            attempts: attempt_number,
            success: completed,
            transcript: submission.transcript.clone(),
            is_near_miss: evaluation.outcome == Outcome::NearMiss,
            xp_earned: delta.xp_earned,
            created_at: now,
        };

        self.store.record_attempt(&record, &state, &event_records)?;

        for event_record in &event_records {
            let _ = self.events_tx.send(event_record.clone());
        }

        tracing::debug!(
            kid = %record.kid_name,
            mission = mission.id,
            outcome = evaluation.outcome.as_str(),
            xp = delta.xp_earned,
            streak = delta.streak,
            "Attempt scored"
        );

        Ok(ScoredAttempt {
            outcome: evaluation.outcome,
            matched_variant: evaluation.matched_variant,
            attempt_number,
            xp_earned: delta.xp_earned,
            total_xp: state.total_xp,
            level: state.level,
            level_progress: leveling::progress_within_level(state.total_xp),
            leveled_up: delta.leveled_up(),
            streak: delta.streak,
            streak_milestone: delta.streak_milestone,
            stars,
            completed,
            show_hint,
            speech_rate,
            feedback,
            badges_earned,
        })
    }

    /// Explicit (re)start. Restarting a mission that already has
    /// attempts finalizes the old run as a failure.
    pub async fn start_mission(
        &self,
        kid_name: &str,
        mission_id: u32,
    ) -> Result<ProgressState, AppError> {
        let kid_lock = self.acquire_kid_lock(kid_name).await;
        let _guard = kid_lock.lock().await;

        let config = self.config.read().await.clone();
        let mission = content::mission(mission_id)
            .ok_or_else(|| AppError::not_found(&format!("Unknown mission: {mission_id}")))?;

        let mut state = self.load_or_init_state(kid_name)?;
        if !content::is_mission_unlocked(mission.id, state.total_xp) {
            return Err(AppError::forbidden(
                "MISSION_LOCKED",
                &format!("Mission '{}' is still locked", mission.word),
            ));
        }

        mission::start(&mut state, mission.id, &config);
        state.updated_at = Utc::now();
        self.store.put_progress(&state)?;
        Ok(state)
    }

    pub async fn abandon_mission(&self, kid_name: &str) -> Result<ProgressState, AppError> {
        let kid_lock = self.acquire_kid_lock(kid_name).await;
        let _guard = kid_lock.lock().await;

        let mut state = self.load_or_init_state(kid_name)?;
        if state.active_mission.is_none() {
            return Ok(state);
        }

        mission::abandon(&mut state);
        state.updated_at = Utc::now();
        self.store.put_progress(&state)?;
        Ok(state)
    }

    pub async fn set_buddy(&self, kid_name: &str, buddy: &str) -> Result<ProgressState, AppError> {
        let kid_lock = self.acquire_kid_lock(kid_name).await;
        let _guard = kid_lock.lock().await;

        let mut state = self.load_or_init_state(kid_name)?;
        state.selected_buddy = buddy.to_string();
        state.updated_at = Utc::now();
        self.store.put_progress(&state)?;
        Ok(state)
    }

    /// A kid that has never played reads as a fresh profile; an
    /// unreadable blob is logged and replaced rather than bricking the
    /// account.
    pub fn load_or_init_state(&self, kid_name: &str) -> Result<ProgressState, AppError> {
        match self.store.get_progress(kid_name) {
            Ok(Some(state)) => Ok(state),
            Ok(None) => Ok(ProgressState::named(kid_name)),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(kid = kid_name, error = %e, "Progress blob unreadable, starting fresh");
                Ok(ProgressState::named(kid_name))
            }
            Err(e) => Err(e.into()),
        }
    }
}
