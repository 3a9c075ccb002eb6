use crate::config::rd::RedisPool;
use crate::errors::ApiError::TooManyRequests;
use crate::errors::ApiResult;
use anyhow::{Context, Result};
use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use redis::ExistenceCheck::NX;
use redis::SetExpiry::EX;
use redis::SetOptions;
use tracing::warn;

/// Middleware limiting how often a route may be hit within a time window.
///
/// Attempts are counted per path and per client (as reported by `X-Forwarded-For`) in Redis.
/// Once more than `max_count` attempts were made within `expires` seconds the request is
/// rejected with `TooManyRequests`.
pub async fn limit_request(
    pool: RedisPool,
    expires: u64,
    max_count: u64,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let key = rate_key(req.uri().path(), req.headers());

    let below_limit = check_rate_limit(&pool, &key, expires, max_count).await?;
    if !below_limit {
        warn!("rate limit hit for {}", key);
        return Err(TooManyRequests("Too many attempts, try again later".to_owned()));
    }

    Ok(next.run(req).await)
}

fn rate_key(path: &str, headers: &HeaderMap) -> String {
    let client = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous");

    format!("rate:{}:{}", path, client)
}

/// Counts one attempt against `key` and reports whether the count is still within `max_count`.
/// The counter is created with an expiry of `expires` seconds on the first attempt.
pub async fn check_rate_limit(
    pool: &RedisPool,
    key: &str,
    expires: u64,
    max_count: u64,
) -> Result<bool> {
    let mut conn = pool.get().await.context("Redis Error")?;

    let rv: [u64; 1] = redis::pipe()
        .atomic()
        .set_options(
            key,
            0,
            SetOptions::default()
                .with_expiration(EX(expires))
                .conditional_set(NX),
        )
        .ignore()
        .incr(key, 1)
        .query_async(&mut *conn).await.context("Redis Error")?;

    Ok(rv[0] <= max_count)
}
