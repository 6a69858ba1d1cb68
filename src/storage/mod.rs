use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    assignments::entities::{Assignment, AssignmentState},
    courses::entities::{Course, CourseMembership},
    students::entities::Student,
    submissions::entities::{
        GradingUpdate, LatestSubmission, NewSubmissionRecord, SubmissionRecord,
    },
    users::entities::User,
};

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户与课程成员
    // 通过 uid 获取用户（JWT 的 sub）
    async fn get_user_by_uid(&self, uid: &str) -> Result<Option<User>>;
    // 通过 uid 获取课程
    async fn get_course_by_uid(&self, uid: &str) -> Result<Option<Course>>;
    // 查询用户在课程中的身份
    async fn get_course_membership(&self, course_id: i64, user_id: i64)
    -> Result<CourseMembership>;
    // 列出课程花名册（按学生 ID 升序）
    async fn list_course_students(&self, course_id: i64) -> Result<Vec<Student>>;
    // 通过 uid 获取学生
    async fn get_student_by_uid(&self, uid: &str) -> Result<Option<Student>>;
    // 批量通过 uid 获取学生，未知 uid 直接忽略
    async fn find_students_by_uids(&self, uids: &[String]) -> Result<Vec<Student>>;

    /// 作业
    // 通过 uid 获取作业
    async fn get_assignment_by_uid(&self, uid: &str) -> Result<Option<Assignment>>;
    // 通过 ID 获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 更新作业状态
    async fn update_assignment_state(
        &self,
        assignment_id: i64,
        state: AssignmentState,
    ) -> Result<Option<Assignment>>;

    /// 提交记录
    // 创建提交记录及学生关联；commit_tag 冲突返回 DuplicateSubmission
    async fn create_submission_record(&self, record: NewSubmissionRecord)
    -> Result<SubmissionRecord>;
    // 通过 commit_tag 获取提交记录
    async fn get_submission_record_by_commit_tag(
        &self,
        commit_tag: &str,
    ) -> Result<Option<SubmissionRecord>>;
    // 写入评测结果
    async fn apply_grading_update(
        &self,
        record_id: i64,
        update: GradingUpdate,
    ) -> Result<Option<SubmissionRecord>>;
    // 课程中每个学生在作业下的最新提交与提交次数
    async fn list_latest_submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<LatestSubmission>>;
    // 某学生在作业下的所有提交（新到旧）
    async fn list_student_submission_records(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<SubmissionRecord>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
