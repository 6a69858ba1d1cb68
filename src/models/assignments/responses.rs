use serde::Serialize;

use super::entities::Assignment;

/// 作业状态更新响应
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentStateResponse {
    pub uid: String,
    pub name: String,
    pub short_name: String,
    pub state: String,
    pub grade: f64,
    pub deadline: chrono::DateTime<chrono::Utc>,
    pub release_date: chrono::DateTime<chrono::Utc>,
}

impl From<Assignment> for AssignmentStateResponse {
    fn from(assignment: Assignment) -> Self {
        Self {
            uid: assignment.uid,
            name: assignment.name,
            short_name: assignment.short_name,
            state: assignment.state.to_string(),
            grade: assignment.grade,
            deadline: assignment.deadline,
            release_date: assignment.release_date,
        }
    }
}
