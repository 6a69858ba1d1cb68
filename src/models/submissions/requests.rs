use serde::Deserialize;

use crate::errors::{OJSystemError, Result};

/// 中间件推送的提交通知
///
/// `additional_data` 是 JSON 编码的所有者标识列表，例如 `"[\"alice-uid\"]"`。
#[derive(Debug, Clone, Deserialize)]
pub struct IngestSubmissionRequest {
    pub upstream: String,
    pub additional_data: String,
    #[serde(alias = "assignment_id")]
    pub assignment_uid: String,
    #[serde(default)]
    pub commit_tag: Option<String>,
}

impl IngestSubmissionRequest {
    /// 校验必填字段
    pub fn validate(&self) -> Result<()> {
        if self.upstream.trim().is_empty() {
            return Err(OJSystemError::validation("upstream 不能为空"));
        }
        if self.assignment_uid.trim().is_empty() {
            return Err(OJSystemError::validation("assignment_uid 不能为空"));
        }
        if let Some(tag) = &self.commit_tag
            && (tag.trim().is_empty() || tag.len() > 64)
        {
            return Err(OJSystemError::validation("commit_tag 长度必须在 1-64 之间"));
        }
        Ok(())
    }

    /// 解析所有者列表，允许字符串或整数元素，去重并保持顺序
    pub fn owner_uids(&self) -> Result<Vec<String>> {
        let values: Vec<serde_json::Value> = serde_json::from_str(&self.additional_data)
            .map_err(|e| OJSystemError::validation(format!("additional_data 不是列表: {e}")))?;

        let mut owners: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let uid = match value {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(OJSystemError::validation(format!(
                        "additional_data 中的所有者标识无效: {other}"
                    )));
                }
            };
            if uid.is_empty() {
                return Err(OJSystemError::validation("additional_data 中存在空标识"));
            }
            if !owners.contains(&uid) {
                owners.push(uid);
            }
        }

        if owners.is_empty() {
            return Err(OJSystemError::validation("additional_data 不能为空列表"));
        }
        Ok(owners)
    }

    pub fn is_grading_script(&self, suffix: &str) -> bool {
        self.upstream.ends_with(suffix)
    }
}

/// 评测结果状态
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GradingOutcome {
    Grading,
    Graded,
    Failed,
}

/// 评测机回写评测结果
#[derive(Debug, Clone, Deserialize)]
pub struct GradingResultRequest {
    pub commit_tag: String,
    pub state: GradingOutcome,
    #[serde(default)]
    pub grade: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(additional_data: &str) -> IngestSubmissionRequest {
        IngestSubmissionRequest {
            upstream: "git@host/course/a1/alice.git".to_string(),
            additional_data: additional_data.to_string(),
            assignment_uid: "A1".to_string(),
            commit_tag: None,
        }
    }

    #[test]
    fn test_owner_uids_parsed() {
        let owners = request(r#"["alice-uid", "bob-uid", "alice-uid"]"#)
            .owner_uids()
            .unwrap();
        assert_eq!(owners, vec!["alice-uid", "bob-uid"]);
    }

    #[test]
    fn test_owner_uids_accepts_numbers() {
        assert_eq!(request("[42]").owner_uids().unwrap(), vec!["42"]);
    }

    #[test]
    fn test_owner_uids_rejects_non_list() {
        assert!(request(r#"{"a": 1}"#).owner_uids().is_err());
        assert!(request("alice-uid").owner_uids().is_err());
        assert!(request("[]").owner_uids().is_err());
        assert!(request(r#"[null]"#).owner_uids().is_err());
    }

    #[test]
    fn test_assignment_id_alias() {
        let req: IngestSubmissionRequest = serde_json::from_value(serde_json::json!({
            "upstream": "u",
            "additional_data": "[\"a\"]",
            "assignment_id": "A1"
        }))
        .unwrap();
        assert_eq!(req.assignment_uid, "A1");
    }

    #[test]
    fn test_grading_script_classification() {
        let mut req = request("[\"a\"]");
        assert!(!req.is_grading_script("_grading_script.git"));
        req.upstream = "git@host/course/a1_grading_script.git".to_string();
        assert!(req.is_grading_script("_grading_script.git"));
    }
}
