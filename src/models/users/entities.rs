use serde::{Deserialize, Serialize};

/// 已认证的调用者
///
/// 登录与 OIDC 账号关联由外部服务负责，这里只保存 JWT `sub` 对应的用户行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub uid: String,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
