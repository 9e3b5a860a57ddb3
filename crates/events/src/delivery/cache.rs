//! Latest-alert cache in Redis.
//!
//! [`RedisAlertCache`] keeps one string per device: the text of the most
//! recent alert, keyed by the device id. Values are written with a plain
//! `SET` and never expire; a newer alert overwrites the older one.

use devwatch_core::{AlertCache, CacheError};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Configuration for the Redis connection.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://:password@127.0.0.1:6379/0`.
    pub url: String,
}

impl RedisConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `REDIS_URL` is not set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        lookup("REDIS_URL").map(|url| Self { url })
    }
}

/// Redis-backed [`AlertCache`].
///
/// Wraps a [`ConnectionManager`], which multiplexes one connection across
/// clones and reconnects after failures. Cloning the cache is cheap.
#[derive(Clone)]
pub struct RedisAlertCache {
    conn: ConnectionManager,
}

impl RedisAlertCache {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(config.url.as_str())?;
        let mut conn = ConnectionManager::new(client).await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::debug!(reply = %pong, "Redis ping succeeded");

        Ok(Self { conn })
    }
}

impl AlertCache for RedisAlertCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await.map_err(cache_error)
    }
}

/// Split Redis failures into connectivity problems and command errors.
fn cache_error(err: redis::RedisError) -> CacheError {
    if err.kind() == redis::ErrorKind::IoError
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        CacheError::Connection(Box::new(err))
    } else {
        CacheError::Command(Box::new(err))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_lookup_returns_none_without_redis_url() {
        assert!(RedisConfig::from_lookup(|_| None).is_none());
    }

    #[test]
    fn from_lookup_reads_redis_url() {
        let config = RedisConfig::from_lookup(|name| {
            (name == "REDIS_URL").then(|| "redis://127.0.0.1:6379/2".to_string())
        })
        .unwrap();
        assert_eq!(config.url, "redis://127.0.0.1:6379/2");
    }

    #[test]
    fn io_error_maps_to_connection() {
        let err = redis::RedisError::from((redis::ErrorKind::IoError, "broken pipe"));
        assert!(matches!(cache_error(err), CacheError::Connection(_)));
    }

    #[test]
    fn type_error_maps_to_command() {
        let err = redis::RedisError::from((redis::ErrorKind::TypeError, "WRONGTYPE"));
        assert!(matches!(cache_error(err), CacheError::Command(_)));
    }

    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let config = RedisConfig {
            url: "not a url".to_string(),
        };
        assert!(RedisAlertCache::connect(&config).await.is_err());
    }
}
