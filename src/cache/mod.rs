//! 对象缓存
//!
//! RequireJWT 使用它缓存令牌对应的用户，支持进程内 Moka 与 Redis 两种后端。

pub mod object_cache;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::CacheConfig;
use crate::errors::Result;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端不可用或值无法读取
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为 0 时使用默认 TTL
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// 按配置创建缓存，Redis 不可用时回退到 Moka
pub async fn create_cache(config: &CacheConfig) -> Result<Arc<dyn ObjectCache>> {
    let moka = || {
        Arc::new(object_cache::moka::MokaCacheWrapper::new(
            config.memory.max_capacity,
            config.default_ttl,
        )) as Arc<dyn ObjectCache>
    };

    match config.cache_type.as_str() {
        "redis" => match object_cache::redis::RedisObjectCache::connect(
            &config.redis.url,
            &config.redis.key_prefix,
            config.default_ttl,
        )
        .await
        {
            Ok(cache) => {
                info!("对象缓存使用 Redis: {}", config.redis.url);
                Ok(Arc::new(cache))
            }
            Err(e) => {
                warn!("Redis 缓存不可用，回退到 Moka: {}", e);
                Ok(moka())
            }
        },
        "moka" => Ok(moka()),
        other => {
            warn!("未知的缓存类型 '{}'，使用 Moka", other);
            Ok(moka())
        }
    }
}
