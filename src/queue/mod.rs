//! 待评测队列（事件存储）
//!
//! 有序集合语义：成员为 JSON 信封，分数为到达时间（Unix 秒），按作业 uid 分键。
//! 同时承担评测脚本推送通知的发布。

pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::QueueConfig;
use crate::errors::{OJSystemError, Result};
use crate::models::queue::entities::PendingEnvelope;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// 原子写入一个成员；已存在的成员只更新分数
    async fn push(&self, key: &str, member: String, score: i64) -> Result<()>;
    /// 按分数升序读取键下的全部成员（快照，不修改队列）
    async fn range(&self, key: &str) -> Result<Vec<(String, i64)>>;
    /// 删除成员，返回是否存在
    async fn remove(&self, key: &str, member: &str) -> Result<bool>;
    /// 发布通知
    async fn publish(&self, channel: &str, message: String) -> Result<()>;

    /// 写入待评测信封
    async fn push_envelope(&self, key: &str, envelope: &PendingEnvelope) -> Result<()> {
        let member = envelope.encode()?;
        self.push(key, member, envelope.event().receive_time).await
    }

    /// 读取并解析待评测信封，无法解析的成员跳过
    async fn list_envelopes(&self, key: &str) -> Result<Vec<PendingEnvelope>> {
        let members = self.range(key).await?;
        let envelopes = members
            .into_iter()
            .filter_map(|(member, _)| match PendingEnvelope::decode(&member) {
                Ok(envelope) => Some(envelope),
                Err(e) => {
                    warn!("跳过无法解析的队列成员 (key={}): {}", key, e);
                    None
                }
            })
            .collect();
        Ok(envelopes)
    }

    /// 删除指定提交记录对应的信封
    async fn remove_record(&self, key: &str, record_id: i64) -> Result<bool> {
        let members = self.range(key).await?;
        let mut removed = false;
        for (member, _) in members {
            let matches = PendingEnvelope::decode(&member)
                .map(|envelope| envelope.event().record_id == record_id)
                .unwrap_or(false);
            if matches {
                removed |= self.remove(key, &member).await?;
            }
        }
        Ok(removed)
    }
}

/// 按配置创建事件存储
pub async fn create_event_store(config: &QueueConfig) -> Result<Arc<dyn EventStore>> {
    match config.queue_type.as_str() {
        "redis" => {
            let store =
                redis::RedisEventStore::connect(&config.redis_url, &config.key_prefix).await?;
            info!("待评测队列使用 Redis: {}", config.redis_url);
            Ok(Arc::new(store))
        }
        "memory" => {
            warn!("待评测队列使用进程内存储，重启后队列内容丢失");
            Ok(Arc::new(memory::MemoryEventStore::new(&config.key_prefix)))
        }
        other => Err(OJSystemError::queue_connection(format!(
            "未知的队列类型: {other}. 支持: redis, memory"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::queue::entities::PendingEvent;

    fn envelope(record_id: i64, receive_time: i64) -> PendingEnvelope {
        PendingEnvelope::new(PendingEvent {
            upstream: format!("git@host/course/a1/{record_id}.git"),
            owner_uids: vec!["alice-uid".to_string()],
            receive_time,
            record_id,
        })
    }

    #[tokio::test]
    async fn test_envelopes_in_arrival_order() {
        let store = memory::MemoryEventStore::new("");
        store.push_envelope("A1", &envelope(2, 200)).await.unwrap();
        store.push_envelope("A1", &envelope(1, 100)).await.unwrap();
        store.push_envelope("A2", &envelope(3, 50)).await.unwrap();

        let ids: Vec<i64> = store
            .list_envelopes("A1")
            .await
            .unwrap()
            .iter()
            .map(|e| e.event().record_id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_undecodable_members_skipped() {
        let store = memory::MemoryEventStore::new("");
        store.push("A1", "garbage".to_string(), 10).await.unwrap();
        store.push_envelope("A1", &envelope(1, 20)).await.unwrap();

        let envelopes = store.list_envelopes("A1").await.unwrap();
        assert_eq!(envelopes.len(), 1);
        assert_eq!(store.range("A1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_record() {
        let store = memory::MemoryEventStore::new("");
        store.push_envelope("A1", &envelope(1, 10)).await.unwrap();
        store.push_envelope("A1", &envelope(2, 20)).await.unwrap();

        assert!(store.remove_record("A1", 1).await.unwrap());
        assert!(!store.remove_record("A1", 1).await.unwrap());

        let left = store.list_envelopes("A1").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].event().record_id, 2);
    }

    #[tokio::test]
    async fn test_unknown_queue_type() {
        let config = QueueConfig {
            queue_type: "kafka".to_string(),
            redis_url: String::new(),
            key_prefix: String::new(),
        };
        assert!(create_event_store(&config).await.is_err());
    }
}
