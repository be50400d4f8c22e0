use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub trust_proxy: bool,
    pub rate_limit: RateLimitConfig,
    pub limits: LimitsConfig,
    pub worker: WorkerConfig,
    pub engine: EngineEnvConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u64,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_sse_connections: usize,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_daily_rollup: bool,
}

/// Engine knobs that ops can override without a rebuild. Everything
/// not listed here keeps its `EngineConfig` default.
#[derive(Debug, Clone)]
pub struct EngineEnvConfig {
    pub xp_per_word: u64,
    pub perfect_round_bonus: u64,
    pub miss_penalty: u64,
    pub hint_after_attempts: u32,
    pub buddy_line_chance: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/speech-practice.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            trust_proxy: env_or_bool("TRUST_PROXY", false),
            rate_limit: RateLimitConfig {
                window_secs: env_or_parse("RATE_LIMIT_WINDOW_SECS", 900_u64),
                max_requests: env_or_parse("RATE_LIMIT_MAX", 500_u64),
            },
            limits: LimitsConfig {
                max_sse_connections: env_or_parse("MAX_SSE_CONNECTIONS", 256_usize),
            },
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_daily_rollup: env_or_bool("ENABLE_DAILY_ROLLUP_WORKER", true),
            },
            engine: EngineEnvConfig {
                xp_per_word: env_or_parse("ENGINE_XP_PER_WORD", crate::constants::XP_PER_WORD),
                perfect_round_bonus: env_or_parse(
                    "ENGINE_PERFECT_ROUND_BONUS",
                    crate::constants::PERFECT_ROUND_BONUS,
                ),
                miss_penalty: env_or_parse("ENGINE_MISS_PENALTY", crate::constants::MISS_PENALTY),
                hint_after_attempts: env_or_parse(
                    "ENGINE_HINT_AFTER_ATTEMPTS",
                    crate::constants::HINT_AFTER_ATTEMPTS,
                ),
                buddy_line_chance: env_or_parse(
                    "ENGINE_BUDDY_LINE_CHANCE",
                    crate::constants::BUDDY_LINE_CHANCE,
                ),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
