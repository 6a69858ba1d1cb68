pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode, assignments::entities::Assignment, courses::entities::CourseRole,
    students::entities::Student,
};
use crate::services::{course_context, find_course_assignment, internal_error};
use crate::storage::Storage;

pub struct HistoryService {
    storage: Option<Arc<dyn Storage>>,
}

impl HistoryService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from(&self.storage, request)
    }

    /// 查询学生在作业下的提交历史（新到旧）
    pub async fn list_history(
        &self,
        request: &HttpRequest,
        assignment_uid: &str,
        student_uid: &str,
    ) -> ActixResult<HttpResponse> {
        list::list_history(self, request, assignment_uid, student_uid).await
    }

    /// 查询学生某一次提交的详情
    pub async fn get_history_record(
        &self,
        request: &HttpRequest,
        assignment_uid: &str,
        student_uid: &str,
        commit_tag: &str,
    ) -> ActixResult<HttpResponse> {
        detail::get_history_record(self, request, assignment_uid, student_uid, commit_tag).await
    }
}

/// 解析作业与学生并校验访问权限：本人或课程教师
pub(crate) async fn resolve_history_target(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    assignment_uid: &str,
    student_uid: &str,
) -> Result<(Assignment, Student), HttpResponse> {
    let (course, membership) = course_context(request)?;
    let assignment = find_course_assignment(storage, &course, assignment_uid).await?;

    // 学生必须在该课程花名册中
    let student = match storage.list_course_students(course.id).await {
        Ok(roster) => roster.into_iter().find(|s| s.uid == student_uid),
        Err(e) => return Err(internal_error("查询课程花名册失败", e)),
    };
    let Some(student) = student else {
        return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "学生不存在",
        )));
    };

    let caller_id = RequireJWT::extract_user_id(request);
    let is_self = caller_id.is_some() && student.user_id == caller_id;
    if !is_self && !membership.has_role(CourseRole::Instructor) {
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "只能查看自己的提交历史",
        )));
    }

    Ok((assignment, student))
}
