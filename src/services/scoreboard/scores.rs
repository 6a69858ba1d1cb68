use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ScoreboardService, rank::build_scoreboard};
use crate::models::ApiResponse;
use crate::services::{course_context, find_course_assignment, internal_error};

pub async fn get_scoreboard(
    service: &ScoreboardService,
    request: &HttpRequest,
    assignment_uid: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (course, _) = match course_context(request) {
        Ok(context) => context,
        Err(response) => return Ok(response),
    };

    let assignment = match find_course_assignment(&storage, &course, assignment_uid).await {
        Ok(assignment) => assignment,
        Err(response) => return Ok(response),
    };

    let roster = match storage.list_course_students(course.id).await {
        Ok(roster) => roster,
        Err(e) => return Ok(internal_error("查询课程花名册失败", e)),
    };

    // 只有评测镜像已构建的作业参与排行
    let latest = if assignment.state.accepts_submissions() {
        match storage
            .list_latest_submissions(course.id, assignment.id)
            .await
        {
            Ok(latest) => latest,
            Err(e) => return Ok(internal_error("查询最新提交失败", e)),
        }
    } else {
        Vec::new()
    };

    let entries = build_scoreboard(roster, latest, assignment.grade);
    Ok(HttpResponse::Ok().json(ApiResponse::success(entries, "查询成功")))
}
