use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::time::Duration;
use tracing::{error, info};

use super::IngestService;
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::{
        entities::GradingUpdate,
        requests::{GradingOutcome, GradingResultRequest},
        responses::SubmissionRecordResponse,
    },
};
use crate::services::{event_store_from, internal_error};

pub async fn record_grading_result(
    service: &IngestService,
    request: &HttpRequest,
    body: GradingResultRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config(request)?;
    let storage = service.get_storage(request)?;
    let event_store = event_store_from(request)?;

    let update = match (body.state, body.grade) {
        (GradingOutcome::Grading, _) => GradingUpdate::Grading,
        (GradingOutcome::Failed, _) => GradingUpdate::Failed,
        (GradingOutcome::Graded, Some(grade)) if grade.is_finite() && grade >= 0.0 => {
            GradingUpdate::Graded { grade }
        }
        (GradingOutcome::Graded, _) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SubmissionPayloadInvalid,
                "graded 状态必须携带非负的 grade",
            )));
        }
    };

    let record = match storage
        .get_submission_record_by_commit_tag(&body.commit_tag)
        .await
    {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "提交记录不存在",
            )));
        }
        Err(e) => return Ok(internal_error("查询提交记录失败", e)),
    };

    let assignment = match storage.get_assignment_by_id(record.assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::AssignmentNotFound,
                "作业不存在",
            )));
        }
        Err(e) => return Ok(internal_error("查询作业失败", e)),
    };

    let updated = match storage.apply_grading_update(record.id, update).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::SubmissionNotFound,
                "提交记录不存在",
            )));
        }
        Err(e) => return Ok(internal_error("写入评测结果失败", e)),
    };

    info!(
        "评测结果已写入: commit_tag={}, state={}, grade={}",
        updated.commit_tag, updated.state, updated.grade
    );

    // 评测结束后从待评测队列移除
    if updated.state.is_final() {
        let remove = event_store.remove_record(&assignment.uid, updated.id);
        match tokio::time::timeout(Duration::from_millis(config.queue_timeout_ms), remove).await {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => info!("待评测队列中没有 record_id={} 的信封", updated.id),
            Ok(Err(e)) => error!("移除待评测信封失败 (record_id={}): {}", updated.id, e),
            Err(_) => error!("移除待评测信封超时 (record_id={})", updated.id),
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SubmissionRecordResponse::from_record(updated, assignment.grade),
        "评测结果已更新",
    )))
}
