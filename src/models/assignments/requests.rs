use serde::Deserialize;

use super::entities::AssignmentState;

/// 更新作业状态请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssignmentStateRequest {
    pub state: AssignmentState,
}
