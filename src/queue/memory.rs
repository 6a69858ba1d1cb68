//! 进程内事件存储，用于测试与本地开发

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use super::EventStore;
use crate::errors::Result;

/// 发布的通知：(频道, 消息)
pub type Published = (String, String);

pub struct MemoryEventStore {
    key_prefix: String,
    // 每个键按 (score, member) 升序保存，与 Redis 有序集合的排序一致
    sets: DashMap<String, Vec<(i64, String)>>,
    notifications: broadcast::Sender<Published>,
}

impl MemoryEventStore {
    pub fn new(key_prefix: &str) -> Self {
        let (notifications, _) = broadcast::channel(256);
        Self {
            key_prefix: key_prefix.to_string(),
            sets: DashMap::new(),
            notifications,
        }
    }

    /// 订阅所有频道的通知
    pub fn subscribe(&self) -> broadcast::Receiver<Published> {
        self.notifications.subscribe()
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn push(&self, key: &str, member: String, score: i64) -> Result<()> {
        let mut set = self.sets.entry(self.make_key(key)).or_default();
        set.retain(|(_, existing)| existing != &member);
        let position = set
            .binary_search_by(|(s, m)| (*s, m.as_str()).cmp(&(score, member.as_str())))
            .unwrap_or_else(|pos| pos);
        set.insert(position, (score, member));
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<(String, i64)>> {
        Ok(self
            .sets
            .get(&self.make_key(key))
            .map(|set| set.iter().map(|(s, m)| (m.clone(), *s)).collect())
            .unwrap_or_default())
    }

    async fn remove(&self, key: &str, member: &str) -> Result<bool> {
        let Some(mut set) = self.sets.get_mut(&self.make_key(key)) else {
            return Ok(false);
        };
        let before = set.len();
        set.retain(|(_, existing)| existing != member);
        Ok(set.len() != before)
    }

    async fn publish(&self, channel: &str, message: String) -> Result<()> {
        // 没有订阅者时 send 返回错误，与 Redis PUBLISH 返回 0 等价
        let receivers = self
            .notifications
            .send((channel.to_string(), message))
            .unwrap_or(0);
        debug!("通知已发布到 {} ({} 个订阅者)", channel, receivers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_score_ordered_by_member() {
        let store = MemoryEventStore::new("");
        store.push("k", "b".to_string(), 1).await.unwrap();
        store.push("k", "a".to_string(), 1).await.unwrap();
        store.push("k", "c".to_string(), 0).await.unwrap();

        let members: Vec<String> = store
            .range("k")
            .await
            .unwrap()
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        assert_eq!(members, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_push_existing_member_updates_score() {
        let store = MemoryEventStore::new("");
        store.push("k", "a".to_string(), 5).await.unwrap();
        store.push("k", "a".to_string(), 9).await.unwrap();
        assert_eq!(store.range("k").await.unwrap(), vec![("a".to_string(), 9)]);
    }

    #[tokio::test]
    async fn test_concurrent_pushes_are_not_lost() {
        let store = std::sync::Arc::new(MemoryEventStore::new(""));
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.push("k", format!("m{i}"), i).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.range("k").await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let store = MemoryEventStore::new("");
        let mut rx = store.subscribe();
        store
            .publish("grade_script_pushed", "{}".to_string())
            .await
            .unwrap();
        let (channel, message) = rx.recv().await.unwrap();
        assert_eq!(channel, "grade_script_pushed");
        assert_eq!(message, "{}");
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_ok() {
        let store = MemoryEventStore::new("");
        assert!(store.publish("c", "m".to_string()).await.is_ok());
    }
}
