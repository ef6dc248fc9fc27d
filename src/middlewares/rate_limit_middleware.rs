use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::redis::RedisServiceTrait;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

#[derive(Clone)]
pub struct RateLimitState {
    pub config: RateLimitConfig,
    pub redis: Arc<dyn RedisServiceTrait>,
}

/// Socket address when served with connect info, else the first forwarded hop.
fn client_key(req: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Fixed window counter per client IP. Redis failures let the request through.
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let key = state.config.get_redis_key(&client_key(&req));

    match state.redis.increment(&key).await {
        Ok(count) => {
            // A counter left without a TTL would never reset, so re-arm it.
            if count == 1 || matches!(state.redis.get_ttl(&key).await, Ok(-1)) {
                if let Err(e) = state.redis.expire(&key, state.config.window_secs).await {
                    warn!("Could not set rate limit window on {}: {}", key, e);
                }
            }
            if count > state.config.max_requests {
                warn!("Rate limit exceeded for {} ({} requests)", key, count);
                return Err(HandlerError::new(HandlerErrorKind::TooManyRequests, RATE_LIMIT_MESSAGE));
            }
        }
        Err(e) => warn!("Rate limiter unavailable, allowing request: {}", e),
    }
    Ok(next.run(req).await)
}
