//! Redis cache for compiled graphs
//!
//! Provides:
//! - Connection management
//! - Generic get/set operations with TTL
//! - Spec fingerprints for graph cache keys
//!
//! The compiler holds no state between calls; caching lives here, at the
//! edge, with every entry bounded by a TTL.

use crate::config::CacheSettings;
use crate::errors::{AppError, Result};
use crate::models::Spec;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Redis cache client. Clones share one multiplexed connection, and each
/// command runs on its own clone so concurrent requests pipeline instead of
/// queueing behind a lock.
#[derive(Clone)]
pub struct Cache {
    connection: MultiplexedConnection,
    default_ttl_secs: u64,
    key_prefix: String,
}

impl Cache {
    /// Connect using `settings.redis_url`; `Ok(None)` when caching is off.
    pub async fn from_settings(settings: &CacheSettings) -> Result<Option<Self>> {
        match settings.redis_url.as_deref() {
            Some(url) => Ok(Some(
                Self::new(url, settings.ttl_secs, &settings.key_prefix).await?,
            )),
            None => Ok(None),
        }
    }

    /// Create a new cache client
    pub async fn new(url: &str, default_ttl_secs: u64, key_prefix: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to create Redis client: {}", e)
            })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        Ok(Self {
            connection,
            default_ttl_secs,
            key_prefix: key_prefix.to_string(),
        })
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.key(key);
        let mut conn = self.connection.clone();

        let value: Option<String> = conn.get(&full_key).await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to get key '{}': {}", full_key, e),
            })?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json)
                    .map_err(|e| AppError::CacheError {
                        message: format!("Failed to parse cached value: {}", e),
                    })?;
                debug!(key = %full_key, "Cache hit");
                Ok(Some(parsed))
            }
            None => {
                debug!(key = %full_key, "Cache miss");
                Ok(None)
            }
        }
    }

    /// Set a value in cache with default TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, self.default_ttl_secs).await
    }

    /// Set a value in cache with custom TTL
    pub async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<()> {
        let full_key = self.key(key);
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to serialize value: {}", e),
            })?;

        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(&full_key, &json, ttl_secs)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to set key '{}': {}", full_key, e),
            })?;

        debug!(key = %full_key, ttl_secs, "Cache set");
        Ok(())
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Redis ping failed: {}", e),
            })?;
        Ok(())
    }
}

/// SHA-256 over the canonical JSON of `spec`, hex encoded
pub fn spec_fingerprint(spec: &Spec) -> Result<String> {
    let canonical = serde_json::to_vec(spec)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Cache key builder helpers
pub mod keys {
    /// Build a compiled graph cache key
    pub fn compiled_graph(spec_hash: &str) -> String {
        format!("graph:{}", spec_hash)
    }

    /// Build an ORCID works listing cache key
    pub fn scholar_works(orcid: &str) -> String {
        format!("works:{}", orcid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mode;

    #[test]
    fn test_key_builders() {
        assert_eq!(keys::compiled_graph("abc123"), "graph:abc123");
        assert_eq!(keys::scholar_works("0000-0002-1825-0097"), "works:0000-0002-1825-0097");
    }

    #[test]
    fn test_spec_fingerprint_is_stable() {
        let spec = Spec::new(Mode::CoWork).with_concepts(["affect"]);
        let a = spec_fingerprint(&spec).unwrap();
        let b = spec_fingerprint(&spec.clone()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let other = spec.with_years(Some(2000), None);
        assert_ne!(a, spec_fingerprint(&other).unwrap());
    }

    /// Runs against `REDIS_URL` when set
    #[tokio::test]
    async fn test_concurrent_round_trips_share_connection() {
        let Ok(url) = std::env::var("REDIS_URL") else {
            return;
        };
        let cache = Cache::new(&url, 30, "cartograph-test").await.unwrap();

        let calls: Vec<_> = (0..16u32)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let key = format!("concurrent:{}", i);
                    cache.set(&key, &i).await.unwrap();
                    cache.get::<u32>(&key).await.unwrap()
                })
            })
            .collect();

        for (i, handle) in calls.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(i as u32));
        }
        cache.ping().await.unwrap();
    }
}
