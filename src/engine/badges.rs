use serde::Serialize;

use super::types::ProgressState;

/// Snapshot of the cumulative counters the badge predicates read.
/// Counters only grow, so every predicate is monotone.
#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeCounters {
    pub total_attempts: u64,
    pub total_successes: u64,
    pub total_stars: u64,
    pub sessions_completed: u64,
    pub distinct_words: usize,
    pub distinct_sounds: usize,
    pub current_streak: u32,
    pub s_sound_attempts: u64,
    /// Number of distinct sounds in the mission catalog, for the
    /// "try everything" badge.
    pub catalog_sound_count: usize,
}

impl BadgeCounters {
    pub fn from_state(state: &ProgressState, catalog_sound_count: usize) -> Self {
        Self {
            total_attempts: state.total_attempts,
            total_successes: state.total_successes,
            total_stars: state.total_stars,
            sessions_completed: state.sessions_completed,
            distinct_words: state.distinct_words.len(),
            distinct_sounds: state.sound_attempts.len(),
            current_streak: state.current_streak,
            s_sound_attempts: state.sound_attempts.get("S").copied().unwrap_or(0),
            catalog_sound_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub satisfied: fn(&BadgeCounters) -> bool,
}

static CATALOG: &[BadgeDef] = &[
    BadgeDef {
        id: "brave_talker",
        name: "Brave Talker",
        emoji: "🦁",
        description: "Complete your first session",
        satisfied: |c| c.sessions_completed >= 1,
    },
    BadgeDef {
        id: "super_s",
        name: "Super S Speaker",
        emoji: "🐍",
        description: "Practice the S sound 5 times",
        satisfied: |c| c.s_sound_attempts >= 5,
    },
    BadgeDef {
        id: "word_wizard",
        name: "Word Wizard",
        emoji: "🧙",
        description: "Say 10 different words",
        satisfied: |c| c.distinct_words >= 10,
    },
    BadgeDef {
        id: "sound_hunter",
        name: "Sound Hunter",
        emoji: "🔍",
        description: "Try 5 different sounds",
        satisfied: |c| c.distinct_sounds >= 5,
    },
    BadgeDef {
        id: "practice_pro",
        name: "Practice Pro",
        emoji: "🏆",
        description: "Complete 3 sessions",
        satisfied: |c| c.sessions_completed >= 3,
    },
    BadgeDef {
        id: "five_star",
        name: "Five Star Friend",
        emoji: "⭐",
        description: "Earn 5 stars",
        satisfied: |c| c.total_stars >= 5,
    },
    BadgeDef {
        id: "story_star",
        name: "Story Star",
        emoji: "📖",
        description: "Get 20 words right",
        satisfied: |c| c.total_successes >= 20,
    },
    BadgeDef {
        id: "happy_helper",
        name: "Happy Helper",
        emoji: "🤗",
        description: "Try every sound category",
        satisfied: |c| c.catalog_sound_count > 0 && c.distinct_sounds >= c.catalog_sound_count,
    },
];

pub fn catalog() -> &'static [BadgeDef] {
    CATALOG
}

pub fn badge(id: &str) -> Option<&'static BadgeDef> {
    CATALOG.iter().find(|b| b.id == id)
}

/// Newly satisfied badges, skipping anything already earned. Calling
/// this twice with the same inputs grants nothing the second time.
pub fn evaluate_badges<'a>(
    counters: &BadgeCounters,
    already_earned: impl Fn(&str) -> bool + 'a,
) -> Vec<&'static BadgeDef> {
    CATALOG
        .iter()
        .filter(|def| !already_earned(def.id) && (def.satisfied)(counters))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = CATALOG.iter().map(|b| b.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn fresh_counters_earn_nothing() {
        let counters = BadgeCounters {
            catalog_sound_count: 20,
            ..Default::default()
        };
        assert!(evaluate_badges(&counters, |_| false).is_empty());
    }

    #[test]
    fn first_completed_session_earns_brave_talker() {
        let counters = BadgeCounters {
            sessions_completed: 1,
            total_attempts: 1,
            total_successes: 1,
            total_stars: 3,
            distinct_words: 1,
            distinct_sounds: 1,
            catalog_sound_count: 20,
            ..Default::default()
        };
        let earned = evaluate_badges(&counters, |_| false);
        let ids: Vec<_> = earned.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["brave_talker"]);
    }

    #[test]
    fn earned_badges_are_not_granted_again() {
        let counters = BadgeCounters {
            sessions_completed: 3,
            total_stars: 9,
            catalog_sound_count: 20,
            ..Default::default()
        };
        let first: Vec<_> = evaluate_badges(&counters, |_| false)
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(first, vec!["brave_talker", "practice_pro", "five_star"]);

        let second = evaluate_badges(&counters, |id| first.contains(&id));
        assert!(second.is_empty());
    }

    #[test]
    fn super_s_counts_only_the_s_sound() {
        let counters = BadgeCounters {
            s_sound_attempts: 5,
            catalog_sound_count: 20,
            ..Default::default()
        };
        let ids: Vec<_> = evaluate_badges(&counters, |_| false)
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["super_s"]);
    }

    #[test]
    fn happy_helper_requires_the_whole_catalog() {
        let short = BadgeCounters {
            distinct_sounds: 19,
            catalog_sound_count: 20,
            ..Default::default()
        };
        assert!(evaluate_badges(&short, |_| false).is_empty());

        let full = BadgeCounters {
            distinct_sounds: 20,
            catalog_sound_count: 20,
            ..Default::default()
        };
        let ids: Vec<_> = evaluate_badges(&full, |_| false)
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(ids.contains(&"sound_hunter"));
        assert!(ids.contains(&"happy_helper"));
    }

    #[test]
    fn counters_derive_from_profile_state() {
        let mut state = ProgressState::named("mia");
        state.total_stars = 7;
        state.sessions_completed = 2;
        state.distinct_words.insert("sun".to_string());
        state.distinct_words.insert("cake".to_string());
        state.sound_attempts.insert("S".to_string(), 6);
        state.sound_attempts.insert("C".to_string(), 1);
        let counters = BadgeCounters::from_state(&state, 20);
        assert_eq!(counters.total_stars, 7);
        assert_eq!(counters.distinct_words, 2);
        assert_eq!(counters.distinct_sounds, 2);
        assert_eq!(counters.s_sound_attempts, 6);
    }
}
