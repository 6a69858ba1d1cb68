use serde::{Deserialize, Serialize};

/// 作业生命周期状态
///
/// `Created -> Finished -> Built` 单向推进，`Disabled` 可从任意状态进入且不可离开。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    Created,
    Finished,
    Built,
    Disabled,
}

impl AssignmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentState::Created => "created",
            AssignmentState::Finished => "finished",
            AssignmentState::Built => "built",
            AssignmentState::Disabled => "disabled",
        }
    }

    /// 是否允许从当前状态迁移到 `target`
    pub fn can_transition_to(&self, target: AssignmentState) -> bool {
        use AssignmentState::*;
        match (self, target) {
            (Disabled, _) => false,
            (_, Disabled) => true,
            (Created, Finished) => true,
            (Finished, Built) => true,
            _ => false,
        }
    }

    /// 只有评测镜像已构建的作业才接收提交、参与排行
    pub fn accepts_submissions(&self) -> bool {
        matches!(self, AssignmentState::Built)
    }
}

impl<'de> Deserialize<'de> for AssignmentState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AssignmentState>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的作业状态: '{s}'. 支持的状态: created, finished, built, disabled"
            ))
        })
    }
}

impl std::fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssignmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "created" => Ok(AssignmentState::Created),
            "finished" => Ok(AssignmentState::Finished),
            "built" => Ok(AssignmentState::Built),
            "disabled" => Ok(AssignmentState::Disabled),
            _ => Err(format!("Invalid assignment state: {s}")),
        }
    }
}

/// 作业
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub uid: String,
    pub course_id: i64,
    pub name: String,
    pub short_name: String,
    pub descr_link: Option<String>,
    /// 满分（排行榜中的 overall_score）
    pub grade: f64,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub release_date: chrono::DateTime<chrono::Utc>,
    pub state: AssignmentState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(AssignmentState::Created.can_transition_to(AssignmentState::Finished));
        assert!(AssignmentState::Finished.can_transition_to(AssignmentState::Built));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!AssignmentState::Created.can_transition_to(AssignmentState::Built));
        assert!(!AssignmentState::Built.can_transition_to(AssignmentState::Created));
        assert!(!AssignmentState::Built.can_transition_to(AssignmentState::Finished));
        assert!(!AssignmentState::Finished.can_transition_to(AssignmentState::Finished));
    }

    #[test]
    fn test_disabled_reachable_and_terminal() {
        for state in [
            AssignmentState::Created,
            AssignmentState::Finished,
            AssignmentState::Built,
        ] {
            assert!(state.can_transition_to(AssignmentState::Disabled));
        }
        for target in [
            AssignmentState::Created,
            AssignmentState::Finished,
            AssignmentState::Built,
            AssignmentState::Disabled,
        ] {
            assert!(!AssignmentState::Disabled.can_transition_to(target));
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(
            "BUILT".parse::<AssignmentState>().unwrap(),
            AssignmentState::Built
        );
        assert_eq!(AssignmentState::Finished.to_string(), "finished");
        assert!("archived".parse::<AssignmentState>().is_err());
    }

    #[test]
    fn test_only_built_accepts_submissions() {
        assert!(AssignmentState::Built.accepts_submissions());
        assert!(!AssignmentState::Created.accepts_submissions());
        assert!(!AssignmentState::Disabled.accepts_submissions());
    }
}
