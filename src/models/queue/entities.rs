//! 待评测队列与通知频道中的消息格式
//!
//! 队列成员是带版本号的 JSON 信封，分数为到达时间（Unix 秒）。

use serde::{Deserialize, Serialize};

use crate::errors::{OJSystemError, Result};

/// 待评测事件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingEvent {
    pub upstream: String,
    pub owner_uids: Vec<String>,
    /// 到达时间（Unix 秒）
    pub receive_time: i64,
    pub record_id: i64,
}

/// 队列信封
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "version")]
pub enum PendingEnvelope {
    #[serde(rename = "1")]
    V1(PendingEvent),
}

impl PendingEnvelope {
    pub fn new(event: PendingEvent) -> Self {
        PendingEnvelope::V1(event)
    }

    pub fn event(&self) -> &PendingEvent {
        match self {
            PendingEnvelope::V1(event) => event,
        }
    }

    pub fn into_event(self) -> PendingEvent {
        match self {
            PendingEnvelope::V1(event) => event,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| OJSystemError::serialization(format!("无法解析队列信封: {e}")))
    }
}

/// 评测脚本推送通知，发布到 `grade_script_pushed` 频道
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeScriptPushed {
    pub upstream: String,
    pub owner_uids: Vec<String>,
    pub receive_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_wire_format() {
        let envelope = PendingEnvelope::new(PendingEvent {
            upstream: "git@host/course/a1/alice.git".to_string(),
            owner_uids: vec!["alice-uid".to_string()],
            receive_time: 1_700_000_000,
            record_id: 7,
        });
        let value: serde_json::Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(value["record_id"], 7);
        assert_eq!(value["receive_time"], 1_700_000_000);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let raw = r#"{"version":"9","upstream":"u","owner_uids":[],"receive_time":1,"record_id":1}"#;
        assert!(PendingEnvelope::decode(raw).is_err());
        assert!(PendingEnvelope::decode("not json").is_err());
    }

    #[test]
    fn test_decode_v1() {
        let raw = r#"{"version":"1","upstream":"u","owner_uids":["a","b"],"receive_time":5,"record_id":3}"#;
        let event = PendingEnvelope::decode(raw).unwrap().into_event();
        assert_eq!(event.owner_uids, vec!["a", "b"]);
        assert_eq!(event.record_id, 3);
    }
}
