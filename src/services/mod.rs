pub mod assignments;
pub mod history;
pub mod ingest;
pub mod pending_queue;
pub mod scoreboard;

pub use assignments::AssignmentService;
pub use history::HistoryService;
pub use ingest::IngestService;
pub use pending_queue::PendingQueueService;
pub use scoreboard::ScoreboardService;

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use tracing::error;

use crate::middlewares::RequireCourseMember;
use crate::models::{
    ApiResponse, ErrorCode, assignments::entities::Assignment, courses::entities::Course,
    courses::entities::CourseMembership,
};
use crate::queue::EventStore;
use crate::storage::Storage;

/// 从 app_data 中取出共享依赖
pub(crate) fn app_data<T: ?Sized + 'static>(request: &HttpRequest) -> actix_web::Result<Arc<T>> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("{} not found in app data", std::any::type_name::<T>());
            actix_web::error::ErrorInternalServerError("Internal server error")
        })
}

pub(crate) fn storage_from(
    cached: &Option<Arc<dyn Storage>>,
    request: &HttpRequest,
) -> actix_web::Result<Arc<dyn Storage>> {
    match cached {
        Some(storage) => Ok(storage.clone()),
        None => app_data::<dyn Storage>(request),
    }
}

pub(crate) fn event_store_from(request: &HttpRequest) -> actix_web::Result<Arc<dyn EventStore>> {
    app_data::<dyn EventStore>(request)
}

/// 记录内部错误，响应中只返回通用信息
pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "服务器内部错误",
    ))
}

/// 课程上下文，由 RequireCourseMember 写入请求扩展
pub(crate) fn course_context(
    request: &HttpRequest,
) -> Result<(Course, CourseMembership), HttpResponse> {
    match (
        RequireCourseMember::extract_course(request),
        RequireCourseMember::extract_membership(request),
    ) {
        (Some(course), Some(membership)) => Ok((course, membership)),
        _ => Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "没有该课程的访问权限",
        ))),
    }
}

/// 查询属于课程的作业，不存在或不属于该课程时返回 404
pub(crate) async fn find_course_assignment(
    storage: &Arc<dyn Storage>,
    course: &Course,
    assignment_uid: &str,
) -> Result<Assignment, HttpResponse> {
    match storage.get_assignment_by_uid(assignment_uid).await {
        Ok(Some(assignment)) if assignment.course_id == course.id => Ok(assignment),
        Ok(_) => Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "作业不存在",
        ))),
        Err(e) => Err(internal_error("查询作业失败", e)),
    }
}
