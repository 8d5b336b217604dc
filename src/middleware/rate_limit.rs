//! Rate limiting middleware using Redis
//!
//! Sliding window counter keyed by the authenticated identity. Applied to
//! the digest endpoint, which fans out to paid external services.

use crate::{
    config::RateLimitConfig,
    error::{ApiError, Result},
    middleware::auth::AuthIdentity,
};
use axum::{extract::Request, middleware::Next, response::Response};
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rate limiting middleware
///
/// Returns 429 Too Many Requests when the window limit is exceeded.
pub fn rate_limit_middleware(
    redis_client: Arc<Client>,
    config: RateLimitConfig,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        let redis_client = redis_client.clone();
        let config = config.clone();

        Box::pin(async move {
            // Extract identity from request extensions (set by auth middleware)
            let identity = request.extensions().get::<AuthIdentity>().ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!(
                    "Rate limit middleware requires auth_middleware"
                ))
            })?;

            let allowed = check_rate_limit(
                &redis_client,
                &identity.external_id,
                config.digest_requests_per_minute,
                config.window_seconds,
            )
            .await?;

            if !allowed {
                warn!("Rate limit exceeded for user: {}", identity.external_id);
                return Err(ApiError::RateLimitExceeded);
            }

            debug!("Rate limit check passed for user: {}", identity.external_id);

            Ok(next.run(request).await)
        })
    }
}

/// Check rate limit using Redis sliding window counter
///
/// Returns true if the request is allowed, false if the limit is exceeded.
async fn check_rate_limit(
    redis_client: &Client,
    external_id: &str,
    limit: u32,
    window_seconds: u32,
) -> Result<bool> {
    let mut conn = redis_client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis connection failed: {}", e)))?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let key = format!("rate_limit:user:{}", external_id);
    let window_start = now - window_seconds as u64;

    // Sorted set with timestamps as scores; drop entries outside the window
    let _: () = conn
        .zrembyscore(&key, 0, window_start as f64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZREMRANGEBYSCORE failed: {}", e)))?;

    let count: u32 = conn
        .zcard(&key)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZCARD failed: {}", e)))?;

    if count >= limit {
        return Ok(false);
    }

    let member = format!("{}:{}", now, uuid::Uuid::new_v4());
    let _: () = conn
        .zadd(&key, member, now as f64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZADD failed: {}", e)))?;

    let _: () = conn
        .expire(&key, (window_seconds + 10) as i64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis EXPIRE failed: {}", e)))?;

    Ok(true)
}
