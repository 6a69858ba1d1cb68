//! Redis 事件存储
//!
//! 启动时建立一个多路复用连接，请求间克隆共享，进程退出时随存储一起释放。

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tracing::{debug, error};

use super::EventStore;
use crate::errors::{OJSystemError, Result};

pub struct RedisEventStore {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisEventStore {
    /// 连接 Redis 并验证可用性
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| OJSystemError::queue_connection(format!("Redis URL 无效: {e}")))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| OJSystemError::queue_connection(format!("无法连接到 Redis: {e}")))?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await.map_err(|e| {
            error!("Failed to ping Redis server: {}. URL: {}", e, url);
            OJSystemError::queue_connection(format!("Redis ping failed: {e}"))
        })?;
        debug!("Redis queue connection test successful: {}", pong);

        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
        })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl EventStore for RedisEventStore {
    async fn push(&self, key: &str, member: String, score: i64) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.zadd::<_, _, _, ()>(self.make_key(key), member, score)
            .await?;
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<(String, i64)>> {
        let mut conn = self.conn.clone();
        let members: Vec<(String, f64)> = conn
            .zrange_withscores(self.make_key(key), 0, -1)
            .await?;
        Ok(members
            .into_iter()
            .map(|(member, score)| (member, score as i64))
            .collect())
    }

    async fn remove(&self, key: &str, member: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.zrem(self.make_key(key), member).await?;
        Ok(removed > 0)
    }

    async fn publish(&self, channel: &str, message: String) -> Result<()> {
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(channel, message).await?;
        debug!("通知已发布到 {} ({} 个订阅者)", channel, receivers);
        Ok(())
    }
}
