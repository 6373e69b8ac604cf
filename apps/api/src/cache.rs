//! Redis-backed response cache and fixed-window rate limiter.
//!
//! The cache is best effort: Redis failures are logged and treated as a miss,
//! so an unavailable Redis never takes a request down with it.

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisResult};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;

const CACHE_PREFIX: &str = "hireskill:cache:";
const RATE_LIMIT_PREFIX: &str = "hireskill:ratelimit:";
pub const RATE_LIMIT_WINDOW_SECONDS: u64 = 60;

#[derive(Clone)]
pub struct Cache {
    client: Client,
}

impl Cache {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> RedisResult<MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    /// Reads a cached JSON value. Any Redis or decode failure is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let key = format!("{CACHE_PREFIX}{key}");
        let raw: Option<String> = match self.connection().await {
            Ok(mut conn) => match conn.get(&key).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, key = %key, "Cache read failed");
                    return None;
                }
            },
            Err(e) => {
                warn!(error = %e, "Cache connection failed");
                return None;
            }
        };

        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, key = %key, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Stores a JSON value with a TTL. Failures are logged and swallowed.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let key = format!("{CACHE_PREFIX}{key}");
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, key = %key, "Cache serialization failed");
                return;
            }
        };

        match self.connection().await {
            Ok(mut conn) => {
                if let Err(e) = conn.set_ex::<_, _, ()>(&key, json, ttl_seconds).await {
                    warn!(error = %e, key = %key, "Cache write failed");
                }
            }
            Err(e) => warn!(error = %e, "Cache connection failed"),
        }
    }

    /// Increments the request counter for `identifier` in the current window.
    /// Returns the count so far and whether the request is still allowed.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> RedisResult<(u64, bool)> {
        let key = format!("{RATE_LIMIT_PREFIX}{identifier}");
        let mut conn = self.connection().await?;

        let count: i64 = conn.incr(&key, 1).await?;
        if count == 1 {
            // First request in the window starts the clock.
            let _: () = conn.expire(&key, window_seconds as i64).await?;
        }

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }

    /// Per-user rate limit for a named endpoint group.
    /// Fails open when Redis is unavailable.
    pub async fn enforce_rate_limit(
        &self,
        scope: &str,
        user_id: Uuid,
        max_requests: u64,
    ) -> Result<(), AppError> {
        let identifier = format!("{scope}:{user_id}");
        match self
            .check_rate_limit(&identifier, max_requests, RATE_LIMIT_WINDOW_SECONDS)
            .await
        {
            Ok((_, true)) => Ok(()),
            Ok((count, false)) => {
                warn!(user_id = %user_id, scope, count, "Rate limit exceeded");
                Err(AppError::RateLimited {
                    retry_after: RATE_LIMIT_WINDOW_SECONDS,
                })
            }
            Err(e) => {
                warn!(error = %e, scope, "Rate limit check failed, allowing request");
                Ok(())
            }
        }
    }

    /// Round-trips a PING; used by the health endpoint.
    pub async fn ping(&self) -> bool {
        match self.connection().await {
            Ok(mut conn) => redis::cmd("PING")
                .query_async::<_, String>(&mut conn)
                .await
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_cache() -> Cache {
        Cache::new(Client::open("redis://127.0.0.1:1/").unwrap())
    }

    #[tokio::test]
    async fn test_get_json_is_a_miss_when_redis_is_down() {
        let cache = unreachable_cache();
        let value: Option<Vec<String>> = cache.get_json("anything").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_fails_open_when_redis_is_down() {
        let cache = unreachable_cache();
        let result = cache.enforce_rate_limit("ai", Uuid::new_v4(), 1).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_ping_reports_unreachable_redis() {
        assert!(!unreachable_cache().ping().await);
    }
}
