use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::Stream;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::response::AppError;
use crate::state::AppState;
use crate::validation::validate_kid_name;

static SSE_CONNECTION_COUNT: AtomicUsize = AtomicUsize::new(0);

struct SseGuard;
impl Drop for SseGuard {
    fn drop(&mut self) {
        SSE_CONNECTION_COUNT.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(sse_handler))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsQuery {
    kid_name: String,
}

/// GET /events?kidName= — push stream of progression milestones
/// (level-ups, streak milestones, badges) for one kid.
pub async fn sse_handler(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if let Err(msg) = validate_kid_name(&query.kid_name) {
        return Err(AppError::unprocessable("INVALID_KID_NAME", msg));
    }

    let max_sse = state.config().limits.max_sse_connections;
    let current = SSE_CONNECTION_COUNT.fetch_add(1, Ordering::SeqCst);
    // The guard owns the decrement from here on, including the
    // over-capacity early return and a stream dropped before first poll.
    let guard = SseGuard;
    if current >= max_sse {
        return Err(AppError::too_many_requests("Too many SSE connections"));
    }

    let mut shutdown_rx = state.shutdown_rx();
    let mut events_rx = state.engine().subscribe_events();
    let kid_name = query.kid_name;

    let stream = async_stream::stream! {
        let _guard = guard;

        loop {
            tokio::select! {
                received = events_rx.recv() => {
                    match received {
                        Ok(record) => {
                            if record.kid_name != kid_name {
                                continue;
                            }
                            if let Ok(json) = serde_json::to_string(&record) {
                                yield Ok(Event::default()
                                    .event("progress")
                                    .data(json));
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, kid = %kid_name, "SSE subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
