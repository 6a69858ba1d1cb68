use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{HistoryService, resolve_history_target};
use crate::models::{ApiResponse, ErrorCode, submissions::responses::SubmissionRecordResponse};
use crate::services::internal_error;

pub async fn get_history_record(
    service: &HistoryService,
    request: &HttpRequest,
    assignment_uid: &str,
    student_uid: &str,
    commit_tag: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (assignment, student) =
        match resolve_history_target(&storage, request, assignment_uid, student_uid).await {
            Ok(target) => target,
            Err(response) => return Ok(response),
        };

    let record = match storage.get_submission_record_by_commit_tag(commit_tag).await {
        Ok(record) => record,
        Err(e) => return Ok(internal_error("查询提交记录失败", e)),
    };

    // 记录必须属于该作业且由该学生提交
    match record {
        Some(record)
            if record.assignment_id == assignment.id
                && record.student_ids.contains(&student.id) =>
        {
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubmissionRecordResponse::from_record(record, assignment.grade),
                "查询成功",
            )))
        }
        _ => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "提交记录不存在",
        ))),
    }
}
