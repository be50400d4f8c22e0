use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use speech_practice_backend::config::{
    Config, EngineEnvConfig, LimitsConfig, RateLimitConfig, WorkerConfig,
};
use speech_practice_backend::constants;
use speech_practice_backend::engine::config::EngineConfig;
use speech_practice_backend::engine::ProgressEngine;
use speech_practice_backend::routes::build_router;
use speech_practice_backend::state::AppState;
use speech_practice_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

// 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
async fn spawn_with_limits(api_limit: u64) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("speech-practice-test.sled");

    let config = Config {
        host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string_lossy().to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        trust_proxy: false,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            max_requests: api_limit,
        },
        limits: LimitsConfig {
            max_sse_connections: 16,
        },
        worker: WorkerConfig {
            is_leader: false,
            enable_daily_rollup: false,
        },
        engine: EngineEnvConfig {
            xp_per_word: constants::XP_PER_WORD,
            perfect_round_bonus: constants::PERFECT_ROUND_BONUS,
            miss_penalty: constants::MISS_PENALTY,
            hint_after_attempts: constants::HINT_AFTER_ATTEMPTS,
            buddy_line_chance: constants::BUDDY_LINE_CHANCE,
        },
    };

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    // Seeded RNG keeps feedback wording deterministic across runs
    let engine = Arc::new(ProgressEngine::with_seed(
        EngineConfig::from_env(&config.engine),
        store.clone(),
        Some(7),
    ));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store, engine, &config, shutdown_tx);

    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with_limits(100).await
}

pub async fn spawn_test_server() -> TestApp {
    spawn_test_app().await
}

pub async fn spawn_test_server_with_limits(api_limit: u64) -> TestApp {
    spawn_with_limits(api_limit).await
}
