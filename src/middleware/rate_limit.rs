use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::sync::{broadcast, Mutex};

use crate::response::{AppError, ErrorBody};
use crate::state::AppState;

/// 固定窗口限流，按客户端 IP 计数，窗口到期即重置。
/// 计数全部在内存里，进程重启后清零。
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u64,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    opened_at: Instant,
}

/// What one check decided, plus everything the RateLimit response
/// headers need.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: u64,
    pub retry_after_secs: u64,
}

impl RateLimiter {
    pub fn new(window_secs: u64, max_requests: u64) -> Self {
        Self {
            window: Duration::from_secs(window_secs),
            max_requests,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, ip: IpAddr) -> Decision {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry(ip).or_insert(Window {
            count: 0,
            opened_at: now,
        });

        if now.duration_since(window.opened_at) >= self.window {
            window.count = 0;
            window.opened_at = now;
        }

        let allowed = window.count < self.max_requests;
        if allowed {
            window.count += 1;
        }

        let elapsed = now.duration_since(window.opened_at);
        let retry_after_secs = self.window.saturating_sub(elapsed).as_secs();
        let reset_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            + retry_after_secs;

        Decision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(window.count),
            reset_at,
            retry_after_secs,
        }
    }

    /// Drop windows that expired long enough ago that they can no
    /// longer affect any decision.
    pub async fn evict_stale(&self) {
        let now = Instant::now();
        let horizon = self.window * 2;
        let mut windows = self.windows.lock().await;
        windows.retain(|_, w| now.duration_since(w.opened_at) <= horizon);
    }
}

/// This middleware is layered on the API router only, so everything
/// that reaches it counts against the limit. Health checks and static
/// assets never pass through here.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_client_ip(req.headers(), state.config().trust_proxy);
    let decision = state.rate_limiter().check(ip).await;

    if !decision.allowed {
        tracing::warn!(client = %ip, "Rate limit exceeded");
        let mut response = (
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody {
                success: false,
                code: "RATE_LIMITED".to_string(),
                message: "Too many requests".to_string(),
                trace_id: None,
            }),
        )
            .into_response();
        apply_rate_limit_headers(&mut response, &decision);
        if let Ok(v) = decision.retry_after_secs.to_string().parse() {
            response.headers_mut().insert("retry-after", v);
        }
        return Ok(response);
    }

    let mut response = next.run(req).await;
    apply_rate_limit_headers(&mut response, &decision);
    Ok(response)
}

fn apply_rate_limit_headers(response: &mut Response, decision: &Decision) {
    if let Ok(v) = decision.limit.to_string().parse() {
        response.headers_mut().insert("ratelimit-limit", v);
    }
    if let Ok(v) = decision.remaining.to_string().parse() {
        response.headers_mut().insert("ratelimit-remaining", v);
    }
    if let Ok(v) = decision.reset_at.to_string().parse() {
        response.headers_mut().insert("ratelimit-reset", v);
    }
}

pub fn extract_client_ip(headers: &HeaderMap, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            if let Some(first) = forwarded.split(',').next() {
                if let Ok(ip) = first.trim().parse() {
                    return ip;
                }
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

pub async fn rate_limit_cleanup_loop(
    limiter: Arc<RateLimiter>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(300));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                limiter.evict_stale().await;
            }
            _ = shutdown_rx.recv() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_up_to_the_limit() {
        let limiter = RateLimiter::new(60, 2);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(limiter.check(ip).await.allowed);
        assert!(limiter.check(ip).await.allowed);
        assert!(!limiter.check(ip).await.allowed);
    }

    #[tokio::test]
    async fn decision_reports_remaining() {
        let limiter = RateLimiter::new(60, 3);
        let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));

        let first = limiter.check(ip).await;
        assert_eq!(first.limit, 3);
        assert_eq!(first.remaining, 2);

        let _ = limiter.check(ip).await;
        let third = limiter.check(ip).await;
        assert_eq!(third.remaining, 0);

        let fourth = limiter.check(ip).await;
        assert!(!fourth.allowed);
        assert_eq!(fourth.remaining, 0);
    }

    #[tokio::test]
    async fn limits_are_per_ip() {
        let limiter = RateLimiter::new(60, 1);
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));
        assert!(limiter.check(a).await.allowed);
        assert!(!limiter.check(a).await.allowed);
        assert!(limiter.check(b).await.allowed);
    }

    #[tokio::test]
    async fn expired_window_resets_the_count() {
        let limiter = RateLimiter::new(0, 1);
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(limiter.check(ip).await.allowed);
        assert!(limiter.check(ip).await.allowed);
    }

    #[test]
    fn extract_ip_falls_back_to_localhost() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_client_ip(&headers, false),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[test]
    fn forwarded_for_respected_only_with_trust_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.2.3, 10.0.0.1".parse().unwrap());
        assert_eq!(
            extract_client_ip(&headers, true),
            IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3))
        );
        assert_eq!(
            extract_client_ip(&headers, false),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }
}
