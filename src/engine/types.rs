use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUDDY, INITIAL_SPEECH_RATE};

/// How a scored attempt turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Success,
    NearMiss,
    Miss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NearMiss => "nearMiss",
            Self::Miss => "miss",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of matching a transcript against a mission target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub outcome: Outcome,
    /// The word or homophone variant that produced the match, if any.
    pub matched_variant: Option<String>,
    /// Whether the target sound label was heard in the transcript.
    pub heard_target_sound: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u32,
    pub current_in_level: u64,
    pub required_in_level: u64,
    pub percent: u8,
}

/// The active run at a single mission. Cleared on completion,
/// finalized as a failure when abandoned or replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionInstance {
    pub mission_id: u32,
    pub attempt_number: u32,
    pub hint_shown: bool,
    pub speech_rate: f64,
    pub had_failure: bool,
    pub started_at: DateTime<Utc>,
}

impl MissionInstance {
    pub fn new(mission_id: u32, initial_speech_rate: f64) -> Self {
        Self {
            mission_id,
            attempt_number: 0,
            hint_shown: false,
            speech_rate: initial_speech_rate,
            had_failure: false,
            started_at: Utc::now(),
        }
    }
}

/// Everything the engine tracks per kid. The stored `level` is a cache;
/// the authoritative value is always recomputed from `total_xp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub kid_name: String,
    pub selected_buddy: String,
    pub total_xp: u64,
    pub level: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_stars: u64,
    pub total_attempts: u64,
    pub total_successes: u64,
    pub total_near_misses: u64,
    pub sessions_completed: u64,
    #[serde(default)]
    pub distinct_words: BTreeSet<String>,
    #[serde(default)]
    pub sound_attempts: BTreeMap<String, u64>,
    #[serde(default)]
    pub sound_successes: BTreeMap<String, u64>,
    #[serde(default)]
    pub completed_mission_ids: Vec<u32>,
    /// badge id -> earned-at timestamp
    #[serde(default)]
    pub earned_badges: BTreeMap<String, DateTime<Utc>>,
    #[serde(default)]
    pub active_mission: Option<MissionInstance>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ProgressState {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            kid_name: "".to_string(),
            selected_buddy: DEFAULT_BUDDY.to_string(),
            total_xp: 0,
            level: 1,
            current_streak: 0,
            best_streak: 0,
            total_stars: 0,
            total_attempts: 0,
            total_successes: 0,
            total_near_misses: 0,
            sessions_completed: 0,
            distinct_words: BTreeSet::new(),
            sound_attempts: BTreeMap::new(),
            sound_successes: BTreeMap::new(),
            completed_mission_ids: Vec::new(),
            earned_badges: BTreeMap::new(),
            active_mission: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl ProgressState {
    pub fn named(kid_name: &str) -> Self {
        Self {
            kid_name: kid_name.to_string(),
            ..Self::default()
        }
    }

    /// Speech rate the client should use for the next prompt.
    pub fn speech_rate(&self) -> f64 {
        self.active_mission
            .as_ref()
            .map(|m| m.speech_rate)
            .unwrap_or(INITIAL_SPEECH_RATE)
    }
}

/// One milestone worth telling the kid (and the parent dashboard) about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    LevelUp { from: u32, to: u32 },
    #[serde(rename_all = "camelCase")]
    StreakMilestone { streak: u32 },
    #[serde(rename_all = "camelCase")]
    BadgeEarned { badge_id: String },
}

impl ProgressEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LevelUp { .. } => "levelUp",
            Self::StreakMilestone { .. } => "streakMilestone",
            Self::BadgeEarned { .. } => "badgeEarned",
        }
    }
}

/// What the API returns for one scored attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAttempt {
    pub outcome: Outcome,
    pub matched_variant: Option<String>,
    pub attempt_number: u32,
    pub xp_earned: i64,
    pub total_xp: u64,
    pub level: u32,
    pub level_progress: LevelProgress,
    pub leveled_up: bool,
    pub streak: u32,
    pub streak_milestone: bool,
    /// Stars for the mission, present only when this attempt completed it.
    pub stars: Option<u8>,
    pub completed: bool,
    pub show_hint: bool,
    pub speech_rate: f64,
    pub feedback: String,
    pub badges_earned: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_starts_at_level_one() {
        let state = ProgressState::default();
        assert_eq!(state.level, 1);
        assert_eq!(state.total_xp, 0);
        assert_eq!(state.selected_buddy, "wolf");
        assert!(state.active_mission.is_none());
    }

    #[test]
    fn outcome_wire_tags_are_camel_case() {
        assert_eq!(
            serde_json::to_string(&Outcome::NearMiss).unwrap(),
            "\"nearMiss\""
        );
        assert_eq!(Outcome::NearMiss.as_str(), "nearMiss");
    }

    #[test]
    fn progress_event_serializes_with_type_tag() {
        let event = ProgressEvent::LevelUp { from: 1, to: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "levelUp");
        assert_eq!(json["from"], 1);
        assert_eq!(json["to"], 2);
    }

    #[test]
    fn state_serde_roundtrip_keeps_counters() {
        let mut state = ProgressState::named("mia");
        state.total_xp = 150;
        state.distinct_words.insert("sun".to_string());
        *state.sound_attempts.entry("S".to_string()).or_insert(0) += 3;
        let encoded = serde_json::to_string(&state).unwrap();
        let decoded: ProgressState = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.total_xp, 150);
        assert_eq!(decoded.sound_attempts.get("S"), Some(&3));
        assert!(decoded.distinct_words.contains("sun"));
    }

    #[test]
    fn older_state_blobs_without_new_fields_still_decode() {
        let legacy = r#"{
            "kidName": "leo",
            "selectedBuddy": "robot",
            "totalXp": 40,
            "level": 2,
            "currentStreak": 1,
            "bestStreak": 4,
            "totalStars": 6,
            "totalAttempts": 9,
            "totalSuccesses": 5,
            "totalNearMisses": 2,
            "sessionsCompleted": 2,
            "createdAt": "2026-01-05T10:00:00Z",
            "updatedAt": "2026-01-06T10:00:00Z"
        }"#;
        let decoded: ProgressState = serde_json::from_str(legacy).unwrap();
        assert_eq!(decoded.total_xp, 40);
        assert!(decoded.earned_badges.is_empty());
        assert!(decoded.active_mission.is_none());
    }
}
