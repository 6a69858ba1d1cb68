use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::models::{
    ApiResponse, ErrorCode,
    assignments::{
        entities::AssignmentState, requests::UpdateAssignmentStateRequest,
        responses::AssignmentStateResponse,
    },
    courses::entities::CourseRole,
};
use crate::services::{course_context, find_course_assignment, internal_error};

pub async fn update_state(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_uid: &str,
    body: UpdateAssignmentStateRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (course, membership) = match course_context(request) {
        Ok(context) => context,
        Err(response) => return Ok(response),
    };

    if !membership.has_role(CourseRole::Instructor) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "只有课程教师可以修改作业状态",
        )));
    }

    let assignment = match find_course_assignment(&storage, &course, assignment_uid).await {
        Ok(assignment) => assignment,
        Err(response) => return Ok(response),
    };

    let target = body.state;
    if !assignment.state.can_transition_to(target) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::AssignmentStateInvalid,
            format!("作业状态不能从 {} 变更为 {}", assignment.state, target),
        )));
    }

    let updated = match storage.update_assignment_state(assignment.id, target).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "作业不存在",
            )));
        }
        Err(e) => return Ok(internal_error("更新作业状态失败", e)),
    };

    info!(
        "作业 {} 状态: {} -> {}",
        updated.uid, assignment.state, updated.state
    );
    if target == AssignmentState::Finished {
        // 镜像构建由外部构建器完成
        info!(
            "请求构建评测镜像: course={}, assignment={}",
            course.uid, updated.uid
        );
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AssignmentStateResponse::from(updated),
        "作业状态已更新",
    )))
}
