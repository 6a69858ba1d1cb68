use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tracing::{debug, error, warn};

use crate::cache::{CacheResult, ObjectCache};
use crate::errors::{OJSystemError, Result};

pub struct RedisObjectCache {
    conn: MultiplexedConnection,
    key_prefix: String,
    ttl: u64, // TTL in seconds
}

impl RedisObjectCache {
    pub async fn connect(url: &str, key_prefix: &str, ttl: u64) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| OJSystemError::cache_connection(format!("Redis URL 无效: {e}")))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| OJSystemError::cache_connection(format!("无法连接到 Redis: {e}")))?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            error!(
                "Failed to ping Redis server: {}. Check Redis server status and URL: {}",
                e, url
            );
            OJSystemError::cache_connection(format!("Redis ping failed: {e}"))
        })?;
        debug!("Redis connection test successful: {}", pong);

        debug!(
            "RedisObjectCache created with prefix: '{}', TTL: {}s",
            key_prefix, ttl
        );

        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
            ttl,
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ObjectCache for RedisObjectCache {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<Option<String>> = conn.get(self.make_key(key)).await;

        match result {
            Ok(Some(data)) => {
                debug!("Successfully retrieved key: {}", key);
                CacheResult::Found(data)
            }
            Ok(None) => {
                debug!("Key not found in cache: {}", key);
                CacheResult::NotFound
            }
            Err(e) => {
                error!("Failed to get key '{}': {}", key, e);
                CacheResult::ExistsButNoValue
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        let mut conn = self.conn.clone();
        let effective_ttl = if ttl == 0 { self.ttl } else { ttl };

        match conn
            .set_ex::<String, String, ()>(self.make_key(&key), value, effective_ttl)
            .await
        {
            Ok(_) => {
                debug!(
                    "Successfully inserted key into cache: {} (TTL: {}s)",
                    key, effective_ttl
                );
            }
            Err(e) => {
                error!("Failed to insert key '{}' into cache: {}", key, e);
            }
        }
    }

    async fn remove(&self, key: &str) {
        let mut conn = self.conn.clone();
        match conn.del::<String, i32>(self.make_key(key)).await {
            Ok(deleted_count) if deleted_count > 0 => {
                debug!("Successfully removed key from cache: {}", key);
            }
            Ok(_) => {
                debug!("Key not found in cache for removal: {}", key);
            }
            Err(e) => {
                error!("Failed to remove key '{}': {}", key, e);
            }
        }
    }

    async fn invalidate_all(&self) {
        warn!("RedisObjectCache does not implement invalidate_all");
    }
}
