use super::config::EngineConfig;
use super::ledger;
use super::types::{MissionInstance, Outcome, ProgressState};

/// Outcome of replacing or clearing an active instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalized {
    /// No instance was active, or it had no attempts yet.
    Nothing,
    /// The previous run had attempts and no success; streak reset.
    Failed,
}

/// Explicit (re)start: any live run is finalized first, then a fresh
/// instance begins with the attempt counter, hint flag and speech rate
/// reset.
pub fn start(state: &mut ProgressState, mission_id: u32, cfg: &EngineConfig) -> Finalized {
    let finalized = finalize_active(state);
    state.active_mission = Some(MissionInstance::new(mission_id, cfg.initial_speech_rate));
    finalized
}

/// Called when an attempt arrives: reuse the live instance for the
/// same mission, otherwise roll the old one over into a fresh start.
pub fn ensure_active(state: &mut ProgressState, mission_id: u32, cfg: &EngineConfig) -> Finalized {
    if let Some(instance) = &state.active_mission {
        if instance.mission_id == mission_id {
            return Finalized::Nothing;
        }
    }
    start(state, mission_id, cfg)
}

/// Abandon whatever is running. A run with attempts and no success is
/// a finalized failure; an untouched run just disappears.
pub fn abandon(state: &mut ProgressState) -> Finalized {
    let finalized = finalize_active(state);
    state.active_mission = None;
    finalized
}

fn finalize_active(state: &mut ProgressState) -> Finalized {
    match state.active_mission.take() {
        Some(instance) if instance.attempt_number > 0 => {
            ledger::finalize_failed_instance(state);
            Finalized::Failed
        }
        _ => Finalized::Nothing,
    }
}

/// Bump the attempt counter and return the 1-based attempt number.
pub fn begin_attempt(instance: &mut MissionInstance) -> u32 {
    instance.attempt_number += 1;
    instance.attempt_number
}

/// After a non-success attempt: latch the hint flag once the threshold
/// is reached, and ratchet the coaching speech rate down on a Miss.
/// The rate only ever decreases within an instance.
pub fn register_non_success(instance: &mut MissionInstance, outcome: Outcome, cfg: &EngineConfig) {
    instance.had_failure = true;
    if instance.attempt_number >= cfg.hint_after_attempts {
        instance.hint_shown = true;
    }
    if outcome == Outcome::Miss {
        let slower = instance.speech_rate * cfg.speech_rate_step;
        instance.speech_rate = slower.max(cfg.min_speech_rate).min(instance.speech_rate);
    }
}
