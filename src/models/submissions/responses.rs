use serde::Serialize;

use super::entities::{SubmissionRecord, SubmissionState};

/// 排行榜条目
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreboardEntry {
    pub nickname: String,
    pub student_uid: String,
    pub overall_score: f64,
    pub score: f64,
    pub delta: Option<f64>,
    pub submission_time: Option<chrono::DateTime<chrono::Utc>>,
    pub submission_count: i64,
}

/// 待评测队列条目
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueueEntry {
    pub submitter: String,
    pub submission_time: chrono::DateTime<chrono::Utc>,
}

/// 提交记录响应
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionRecordResponse {
    pub commit_tag: String,
    pub grade: f64,
    pub overall_score: f64,
    pub delta: Option<f64>,
    pub state: SubmissionState,
    pub submission_time: chrono::DateTime<chrono::Utc>,
    pub grade_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl SubmissionRecordResponse {
    pub fn from_record(record: SubmissionRecord, overall_score: f64) -> Self {
        Self {
            commit_tag: record.commit_tag,
            grade: record.grade,
            overall_score,
            delta: record.delta,
            state: record.state,
            submission_time: chrono::DateTime::from_timestamp_millis(record.submission_time)
                .unwrap_or_default(),
            grade_time: (record.grade_time > 0)
                .then(|| chrono::DateTime::from_timestamp_millis(record.grade_time))
                .flatten(),
        }
    }
}
