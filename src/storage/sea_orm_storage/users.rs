use super::SeaOrmStorage;
use crate::entity::users::{Column, Entity as Users};
use crate::errors::{OJSystemError, Result};
use crate::models::users::entities::User;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

impl SeaOrmStorage {
    /// 通过 uid 获取用户
    pub async fn get_user_by_uid_impl(&self, uid: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Uid.eq(uid))
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }
}
