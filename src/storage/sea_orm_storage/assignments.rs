use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::errors::{OJSystemError, Result};
use crate::models::assignments::entities::{Assignment, AssignmentState};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 通过 uid 获取作业
    pub async fn get_assignment_by_uid_impl(&self, uid: &str) -> Result<Option<Assignment>> {
        let result = Assignments::find()
            .filter(Column::Uid.eq(uid))
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 更新作业状态（迁移合法性由调用方校验）
    pub async fn update_assignment_state_impl(
        &self,
        assignment_id: i64,
        state: AssignmentState,
    ) -> Result<Option<Assignment>> {
        let existing = Assignments::find_by_id(assignment_id)
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询作业失败: {e}")))?;

        let Some(model) = existing else {
            return Ok(None);
        };

        let mut active: ActiveModel = model.into();
        active.state = Set(state.to_string());
        active.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("更新作业状态失败: {e}")))?;

        Ok(Some(updated.into_assignment()))
    }
}
