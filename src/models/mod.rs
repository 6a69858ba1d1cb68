pub mod assignments;
pub mod common;
pub mod courses;
pub mod queue;
pub mod students;
pub mod submissions;
pub mod users;

pub use common::response::ApiResponse;

/// 应用启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,

    // 课程
    CourseNotFound = 2000,
    CoursePermissionDenied = 2001,

    // 作业
    AssignmentNotFound = 3000,
    AssignmentNotAccepting = 3001,
    AssignmentStateInvalid = 3002,

    // 提交
    SubmissionNotFound = 4000,
    SubmissionPayloadInvalid = 4001,
    StudentNotFound = 4002,
}
