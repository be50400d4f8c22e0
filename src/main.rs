use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use speech_practice_backend::config::Config;
use speech_practice_backend::content;
use speech_practice_backend::engine::config::EngineConfig;
use speech_practice_backend::engine::ProgressEngine;
use speech_practice_backend::logging::{init_tracing, LogConfig};
use speech_practice_backend::middleware::rate_limit;
use speech_practice_backend::routes::build_router;
use speech_practice_backend::state::AppState;
use speech_practice_backend::store::Store;
use speech_practice_backend::workers::WorkerManager;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

const CSP_HEADER: &str = "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; connect-src 'self'; img-src 'self' data: blob:; media-src 'self' blob:; frame-ancestors 'none'; base-uri 'self'; form-action 'self'";
const HSTS_HEADER: &str = "max-age=31536000; includeSubDomains";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig::from(&config));
    tracing::info!("Starting speech-practice-backend");

    // Refuse to serve a malformed mission catalog
    if let Err(e) = content::validate_catalog() {
        panic!("FATAL: invalid mission catalog: {e}");
    }

    let store = Arc::new(Store::open(&config.sled_path).expect("Failed to open sled database"));
    store.run_migrations().expect("Failed to run migrations");

    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let engine_config = EngineConfig::from_env(&config.engine);
    let engine = Arc::new(ProgressEngine::new(engine_config, store.clone()));

    let state = AppState::new(store.clone(), engine, &config, shutdown_tx.clone());
    let state_for_shutdown = state.clone();

    tokio::spawn(rate_limit::rate_limit_cleanup_loop(
        state.rate_limiter().clone(),
        shutdown_tx.subscribe(),
    ));

    let worker_handle = if config.worker.is_leader {
        let worker_manager =
            WorkerManager::new(store.clone(), shutdown_tx.subscribe(), &config.worker);
        Some(tokio::spawn(async move {
            if let Err(e) = worker_manager.start().await {
                tracing::error!(error = %e, "Worker manager failed");
            }
        }))
    } else {
        None
    };

    let app = with_security_headers(
        build_router(state)
            .layer(build_cors_layer(&config))
            .layer(CompressionLayer::new())
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::new()),
    );

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    let server_future = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    if let Some(handle) = worker_handle {
        // Worker 作为独立后台任务运行，panic 仅记录错误，不终止 HTTP 服务器
        tokio::spawn(async move {
            match handle.await {
                Err(e) => {
                    tracing::error!(error = %e, "Worker task panicked, HTTP server continues")
                }
                Ok(()) => tracing::info!("Worker manager exited normally"),
            }
        });
    }

    if let Err(e) = server_future.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!(
        uptime_secs = state_for_shutdown.uptime_secs(),
        "Shutdown complete"
    );
}

fn with_security_headers(router: axum::Router) -> axum::Router {
    let static_header = |name: &'static str, value: &'static str| {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        )
    };

    router
        .layer(static_header("x-content-type-options", "nosniff"))
        .layer(static_header("x-frame-options", "DENY"))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(static_header("content-security-policy", CSP_HEADER))
        .layer(static_header("strict-transport-security", HSTS_HEADER))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods(Any);

    let origin = config.cors_origin.trim();
    if origin == "*" {
        // 通配符模式仅用于开发环境，通配符与 credentials 互斥
        return base.allow_origin(Any).allow_credentials(false);
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => base.allow_origin(value),
        Err(e) => panic!(
            "FATAL: Invalid CORS_ORIGIN '{}': {}. \
             Fix the CORS_ORIGIN environment variable.",
            config.cors_origin, e
        ),
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    wait_for_signal().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
