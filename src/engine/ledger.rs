use super::config::EngineConfig;
use super::leveling;
use super::types::{Outcome, ProgressEvent, ProgressState};

/// What one scored attempt did to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDelta {
    pub xp_earned: i64,
    pub old_level: u32,
    pub new_level: u32,
    pub streak: u32,
    pub streak_milestone: bool,
}

impl LedgerDelta {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// XP delta for one outcome. The first-try bonus rewards precision,
/// not just eventual success.
pub fn award_xp(outcome: Outcome, attempt_number: u32, cfg: &EngineConfig) -> i64 {
    match outcome {
        Outcome::Success => {
            let mut delta = cfg.xp_per_word as i64;
            if attempt_number == 1 {
                delta += cfg.perfect_round_bonus as i64;
            }
            delta
        }
        Outcome::NearMiss => 0,
        Outcome::Miss => -(cfg.miss_penalty as i64),
    }
}

/// Total XP never goes below zero, whatever the penalty.
pub fn apply_xp(total_xp: u64, delta: i64) -> u64 {
    if delta >= 0 {
        total_xp.saturating_add(delta as u64)
    } else {
        total_xp.saturating_sub(delta.unsigned_abs())
    }
}

/// 1 try earns 3 stars, 2 tries earn 2, anything longer earns 1.
pub fn stars_for_attempts(attempts: u32) -> u8 {
    match attempts {
        0 | 1 => 3,
        2 => 2,
        _ => 1,
    }
}

/// Apply one scored attempt to the profile: XP, level cache, streak,
/// and the cumulative counters the badges read. Returns the delta plus
/// any level-up / streak-milestone events (level-up wins the turn, so
/// at most one of the two notification events fires).
pub fn apply_attempt(
    state: &mut ProgressState,
    outcome: Outcome,
    attempt_number: u32,
    word: &str,
    sound: &str,
    cfg: &EngineConfig,
    events: &mut Vec<ProgressEvent>,
) -> LedgerDelta {
    let xp_earned = award_xp(outcome, attempt_number, cfg);
    let old_level = leveling::level_for_xp(state.total_xp);

    state.total_xp = apply_xp(state.total_xp, xp_earned);
    let new_level = leveling::level_for_xp(state.total_xp);
    state.level = new_level;

    state.total_attempts += 1;
    state
        .distinct_words
        .insert(super::evaluator::normalize(word));
    *state.sound_attempts.entry(sound.to_string()).or_insert(0) += 1;

    match outcome {
        Outcome::Success => {
            state.total_successes += 1;
            *state.sound_successes.entry(sound.to_string()).or_insert(0) += 1;
            state.current_streak += 1;
            state.best_streak = state.best_streak.max(state.current_streak);
        }
        Outcome::NearMiss => {
            state.total_near_misses += 1;
        }
        Outcome::Miss => {}
    }

    let leveled_up = new_level > old_level;
    if leveled_up {
        events.push(ProgressEvent::LevelUp {
            from: old_level,
            to: new_level,
        });
    }

    let streak_milestone = outcome.is_success()
        && !leveled_up
        && state.current_streak > 0
        && state.current_streak % cfg.streak_milestone_interval == 0;
    if streak_milestone {
        events.push(ProgressEvent::StreakMilestone {
            streak: state.current_streak,
        });
    }

    LedgerDelta {
        xp_earned,
        old_level,
        new_level,
        streak: state.current_streak,
        streak_milestone,
    }
}

/// A mission instance ended without a Success. This is the only place
/// the streak resets; intermediate misses inside a live instance do
/// not touch it.
pub fn finalize_failed_instance(state: &mut ProgressState) {
    state.current_streak = 0;
}

/// A mission instance ended with a Success: bank the stars and mark
/// the mission completed (set semantics, the list only grows).
pub fn finalize_completed_instance(state: &mut ProgressState, mission_id: u32, stars: u8) {
    state.total_stars += stars as u64;
    state.sessions_completed += 1;
    if !state.completed_mission_ids.contains(&mission_id) {
        state.completed_mission_ids.push(mission_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn first_try_success_gets_the_bonus() {
        assert_eq!(award_xp(Outcome::Success, 1, &cfg()), 30);
        assert_eq!(award_xp(Outcome::Success, 2, &cfg()), 10);
        assert_eq!(award_xp(Outcome::Success, 5, &cfg()), 10);
    }

    #[test]
    fn near_miss_and_miss_award_nothing_by_default() {
        assert_eq!(award_xp(Outcome::NearMiss, 1, &cfg()), 0);
        assert_eq!(award_xp(Outcome::Miss, 1, &cfg()), 0);
    }

    #[test]
    fn configured_penalty_never_goes_below_zero() {
        let cfg = EngineConfig {
            miss_penalty: 5,
            ..Default::default()
        };
        assert_eq!(award_xp(Outcome::Miss, 1, &cfg), -5);
        assert_eq!(apply_xp(3, -5), 0);
        assert_eq!(apply_xp(8, -5), 3);
    }

    #[test]
    fn star_ladder() {
        assert_eq!(stars_for_attempts(1), 3);
        assert_eq!(stars_for_attempts(2), 2);
        assert_eq!(stars_for_attempts(3), 1);
        assert_eq!(stars_for_attempts(9), 1);
    }

    #[test]
    fn crossing_a_threshold_fires_level_up() {
        let mut state = ProgressState::named("mia");
        state.total_xp = 35;
        let mut events = Vec::new();
        let delta = apply_attempt(
            &mut state,
            Outcome::Success,
            1,
            "Sun",
            "S",
            &cfg(),
            &mut events,
        );
        assert_eq!(delta.xp_earned, 30);
        assert_eq!(state.total_xp, 65);
        assert_eq!(delta.old_level, 1);
        assert_eq!(delta.new_level, 2);
        assert!(delta.leveled_up());
        assert_eq!(
            events,
            vec![ProgressEvent::LevelUp { from: 1, to: 2 }]
        );
    }

    #[test]
    fn streak_milestone_fires_every_third_success() {
        let mut state = ProgressState::named("mia");
        state.current_streak = 2;
        // Enough XP headroom that no level boundary is crossed.
        state.total_xp = 41;
        let mut events = Vec::new();
        let delta = apply_attempt(
            &mut state,
            Outcome::Success,
            2,
            "Cake",
            "C",
            &cfg(),
            &mut events,
        );
        assert_eq!(delta.streak, 3);
        assert!(delta.streak_milestone);
        assert_eq!(events, vec![ProgressEvent::StreakMilestone { streak: 3 }]);
    }

    #[test]
    fn level_up_suppresses_streak_milestone_in_the_same_turn() {
        let mut state = ProgressState::named("mia");
        state.current_streak = 2;
        state.total_xp = 35;
        let mut events = Vec::new();
        let delta = apply_attempt(
            &mut state,
            Outcome::Success,
            1,
            "Sun",
            "S",
            &cfg(),
            &mut events,
        );
        assert_eq!(delta.streak, 3);
        assert!(delta.leveled_up());
        assert!(!delta.streak_milestone);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::LevelUp { .. }));
    }

    #[test]
    fn intermediate_miss_keeps_the_streak() {
        let mut state = ProgressState::named("mia");
        state.current_streak = 4;
        let mut events = Vec::new();
        apply_attempt(
            &mut state,
            Outcome::Miss,
            1,
            "Sun",
            "S",
            &cfg(),
            &mut events,
        );
        assert_eq!(state.current_streak, 4);
        assert!(events.is_empty());
    }

    #[test]
    fn finalized_failure_resets_the_streak() {
        let mut state = ProgressState::named("mia");
        state.current_streak = 4;
        state.best_streak = 4;
        finalize_failed_instance(&mut state);
        assert_eq!(state.current_streak, 0);
        assert_eq!(state.best_streak, 4);
    }

    #[test]
    fn completion_banks_stars_and_dedupes_mission_ids() {
        let mut state = ProgressState::named("mia");
        finalize_completed_instance(&mut state, 1, 3);
        finalize_completed_instance(&mut state, 1, 2);
        assert_eq!(state.total_stars, 5);
        assert_eq!(state.sessions_completed, 2);
        assert_eq!(state.completed_mission_ids, vec![1]);
    }

    #[test]
    fn counters_track_words_and_sounds() {
        let mut state = ProgressState::named("mia");
        let mut events = Vec::new();
        apply_attempt(
            &mut state,
            Outcome::Success,
            1,
            "Sun",
            "S",
            &cfg(),
            &mut events,
        );
        apply_attempt(
            &mut state,
            Outcome::NearMiss,
            2,
            "Snail",
            "SN",
            &cfg(),
            &mut events,
        );
        assert_eq!(state.total_attempts, 2);
        assert_eq!(state.total_successes, 1);
        assert_eq!(state.total_near_misses, 1);
        assert!(state.distinct_words.contains("sun"));
        assert!(state.distinct_words.contains("snail"));
        assert_eq!(state.sound_attempts.get("S"), Some(&1));
        assert_eq!(state.sound_attempts.get("SN"), Some(&1));
        assert_eq!(state.sound_successes.get("S"), Some(&1));
    }
}
