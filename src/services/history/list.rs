use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{HistoryService, resolve_history_target};
use crate::models::{ApiResponse, submissions::responses::SubmissionRecordResponse};
use crate::services::internal_error;

pub async fn list_history(
    service: &HistoryService,
    request: &HttpRequest,
    assignment_uid: &str,
    student_uid: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let (assignment, student) =
        match resolve_history_target(&storage, request, assignment_uid, student_uid).await {
            Ok(target) => target,
            Err(response) => return Ok(response),
        };

    let records = match storage
        .list_student_submission_records(assignment.id, student.id)
        .await
    {
        Ok(records) => records,
        Err(e) => return Ok(internal_error("查询提交历史失败", e)),
    };

    let items: Vec<SubmissionRecordResponse> = records
        .into_iter()
        .map(|record| SubmissionRecordResponse::from_record(record, assignment.grade))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "查询成功")))
}
