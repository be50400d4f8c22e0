use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default = "default_xp_per_word")]
    pub xp_per_word: u64,
    #[serde(default = "default_perfect_round_bonus")]
    pub perfect_round_bonus: u64,
    /// 失败扣除的经验值，总经验保底为 0
    #[serde(default = "default_miss_penalty")]
    pub miss_penalty: u64,
    #[serde(default = "default_streak_milestone_interval")]
    pub streak_milestone_interval: u32,
    #[serde(default = "default_initial_speech_rate")]
    pub initial_speech_rate: f64,
    #[serde(default = "default_speech_rate_step")]
    pub speech_rate_step: f64,
    #[serde(default = "default_min_speech_rate")]
    pub min_speech_rate: f64,
    #[serde(default = "default_hint_after_attempts")]
    pub hint_after_attempts: u32,
    #[serde(default = "default_buddy_line_chance")]
    pub buddy_line_chance: f64,
}

fn default_xp_per_word() -> u64 {
    constants::XP_PER_WORD
}

fn default_perfect_round_bonus() -> u64 {
    constants::PERFECT_ROUND_BONUS
}

fn default_miss_penalty() -> u64 {
    constants::MISS_PENALTY
}

fn default_streak_milestone_interval() -> u32 {
    constants::STREAK_MILESTONE_INTERVAL
}

fn default_initial_speech_rate() -> f64 {
    constants::INITIAL_SPEECH_RATE
}

fn default_speech_rate_step() -> f64 {
    constants::SPEECH_RATE_STEP
}

fn default_min_speech_rate() -> f64 {
    constants::MIN_SPEECH_RATE
}

fn default_hint_after_attempts() -> u32 {
    constants::HINT_AFTER_ATTEMPTS
}

fn default_buddy_line_chance() -> f64 {
    constants::BUDDY_LINE_CHANCE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            xp_per_word: constants::XP_PER_WORD,
            perfect_round_bonus: constants::PERFECT_ROUND_BONUS,
            miss_penalty: constants::MISS_PENALTY,
            streak_milestone_interval: constants::STREAK_MILESTONE_INTERVAL,
            initial_speech_rate: constants::INITIAL_SPEECH_RATE,
            speech_rate_step: constants::SPEECH_RATE_STEP,
            min_speech_rate: constants::MIN_SPEECH_RATE,
            hint_after_attempts: constants::HINT_AFTER_ATTEMPTS,
            buddy_line_chance: constants::BUDDY_LINE_CHANCE,
        }
    }
}

impl EngineConfig {
    pub fn from_env(env_config: &crate::config::EngineEnvConfig) -> Self {
        Self {
            xp_per_word: env_config.xp_per_word,
            perfect_round_bonus: env_config.perfect_round_bonus,
            miss_penalty: env_config.miss_penalty,
            hint_after_attempts: env_config.hint_after_attempts,
            buddy_line_chance: env_config.buddy_line_chance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.xp_per_word == 0 || self.xp_per_word > 10_000 {
            return Err("xp_per_word must be in [1,10000]".to_string());
        }
        if self.perfect_round_bonus > 10_000 {
            return Err("perfect_round_bonus must be <= 10000".to_string());
        }
        if self.miss_penalty > 10_000 {
            return Err("miss_penalty must be <= 10000".to_string());
        }
        if self.streak_milestone_interval < 1 {
            return Err("streak_milestone_interval must be >= 1".to_string());
        }
        if !(0.0..=2.0).contains(&self.initial_speech_rate) || self.initial_speech_rate == 0.0 {
            return Err("initial_speech_rate must be in (0,2]".to_string());
        }
        if !(0.0..=1.0).contains(&self.speech_rate_step) || self.speech_rate_step == 0.0 {
            return Err("speech_rate_step must be in (0,1]".to_string());
        }
        if self.min_speech_rate <= 0.0 || self.min_speech_rate > self.initial_speech_rate {
            return Err("min_speech_rate must be in (0,initial_speech_rate]".to_string());
        }
        if self.hint_after_attempts < 1 {
            return Err("hint_after_attempts must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.buddy_line_chance) {
            return Err("buddy_line_chance must be in [0,1]".to_string());
        }
        Ok(())
    }
}
