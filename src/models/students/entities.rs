use serde::{Deserialize, Serialize};

/// 学生
///
/// `enroll_email` 是关联账号前的稳定身份；关联后 `user_id` 指向 User。
/// `uid` 是外部仓库中间件使用的所有者标识。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub uid: String,
    pub user_id: Option<i64>,
    pub enroll_email: String,
    pub student_id: String,
    pub name: String,
    pub nickname: String,
}
