use serde::{Deserialize, Serialize};

/// 提交记录状态，数据库中以整数保存
///
/// `0=failed, 1=received, 2=grading, 3=graded`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Failed,
    Received,
    Grading,
    Graded,
}

impl SubmissionState {
    pub fn code(&self) -> i32 {
        match self {
            SubmissionState::Failed => 0,
            SubmissionState::Received => 1,
            SubmissionState::Grading => 2,
            SubmissionState::Graded => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SubmissionState::Failed),
            1 => Some(SubmissionState::Received),
            2 => Some(SubmissionState::Grading),
            3 => Some(SubmissionState::Graded),
            _ => None,
        }
    }

    /// 评测已结束（成功或失败），记录不再位于待评测队列
    pub fn is_final(&self) -> bool {
        matches!(self, SubmissionState::Graded | SubmissionState::Failed)
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Failed => write!(f, "failed"),
            SubmissionState::Received => write!(f, "received"),
            SubmissionState::Grading => write!(f, "grading"),
            SubmissionState::Graded => write!(f, "graded"),
        }
    }
}

/// 提交记录
///
/// 时间字段均为 Unix 毫秒；`grade_time` 为 0 表示尚未评测。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: i64,
    pub commit_tag: String,
    pub assignment_id: i64,
    pub student_ids: Vec<i64>,
    pub grade: f64,
    pub delta: Option<f64>,
    pub submission_time: i64,
    pub grade_time: i64,
    pub state: SubmissionState,
    pub message: Option<String>,
}

/// 新建提交记录所需数据
#[derive(Debug, Clone)]
pub struct NewSubmissionRecord {
    pub commit_tag: String,
    pub assignment_id: i64,
    pub student_ids: Vec<i64>,
    pub submission_time: i64,
    pub audit: SubmissionAudit,
}

/// 评测结果更新
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradingUpdate {
    Grading,
    Graded { grade: f64 },
    Failed,
}

impl GradingUpdate {
    pub fn state(&self) -> SubmissionState {
        match self {
            GradingUpdate::Grading => SubmissionState::Grading,
            GradingUpdate::Graded { .. } => SubmissionState::Graded,
            GradingUpdate::Failed => SubmissionState::Failed,
        }
    }
}

/// 每个学生在某作业下的最新提交及提交次数
#[derive(Debug, Clone, PartialEq)]
pub struct LatestSubmission {
    pub student_id: i64,
    pub record_id: i64,
    pub grade: f64,
    pub delta: Option<f64>,
    pub submission_time: i64,
    pub submission_count: i64,
}

/// 随提交记录保存的审计信息，带版本号
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "version")]
pub enum SubmissionAudit {
    #[serde(rename = "1")]
    V1 {
        upstream: String,
        owner_uids: Vec<String>,
        assignment_uid: String,
        receive_time: i64,
        /// 中间件原始请求体
        payload: serde_json::Value,
    },
}

impl SubmissionAudit {
    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_are_total() {
        for code in 0..4 {
            let state = SubmissionState::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert!(SubmissionState::from_code(4).is_none());
        assert!(SubmissionState::from_code(-1).is_none());
    }

    #[test]
    fn test_final_states() {
        assert!(SubmissionState::Graded.is_final());
        assert!(SubmissionState::Failed.is_final());
        assert!(!SubmissionState::Received.is_final());
        assert!(!SubmissionState::Grading.is_final());
    }

    #[test]
    fn test_audit_carries_version_tag() {
        let audit = SubmissionAudit::V1 {
            upstream: "git@host/course/a1/alice.git".to_string(),
            owner_uids: vec!["alice-uid".to_string()],
            assignment_uid: "A1".to_string(),
            receive_time: 1_700_000_000,
            payload: serde_json::json!({"upstream": "git@host/course/a1/alice.git"}),
        };
        let value: serde_json::Value = serde_json::from_str(&audit.to_json().unwrap()).unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(value["owner_uids"][0], "alice-uid");
    }
}
