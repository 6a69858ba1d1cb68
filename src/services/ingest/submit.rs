use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::IngestService;
use crate::config::SubmissionConfig;
use crate::models::{
    ApiResponse, ErrorCode,
    queue::entities::{GradeScriptPushed, PendingEnvelope, PendingEvent},
    submissions::{
        entities::{NewSubmissionRecord, SubmissionAudit},
        requests::IngestSubmissionRequest,
    },
};
use crate::queue::EventStore;
use crate::services::{event_store_from, internal_error};

fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub async fn ingest_submission(
    service: &IngestService,
    request: &HttpRequest,
    payload: serde_json::Value,
) -> ActixResult<HttpResponse> {
    let config = service.get_config(request)?;
    let event_store = event_store_from(request)?;

    let ingest: IngestSubmissionRequest = match serde_json::from_value(payload.clone()) {
        Ok(ingest) => ingest,
        Err(e) => {
            return Ok(bad_request(
                ErrorCode::SubmissionPayloadInvalid,
                format!("缺少或格式错误的字段: {e}"),
            ));
        }
    };

    if let Err(e) = ingest.validate() {
        return Ok(bad_request(ErrorCode::SubmissionPayloadInvalid, e.message()));
    }

    let owner_uids = match ingest.owner_uids() {
        Ok(owners) => owners,
        Err(e) => {
            return Ok(bad_request(ErrorCode::SubmissionPayloadInvalid, e.message()));
        }
    };

    let now = chrono::Utc::now();

    // 评测脚本仓库的推送只发通知，不产生提交记录
    if ingest.is_grading_script(&config.grading_script_suffix) {
        let notification = GradeScriptPushed {
            upstream: ingest.upstream.clone(),
            owner_uids,
            receive_time: now.timestamp(),
        };
        publish_grade_script_pushed(event_store, &config, notification);
        return Ok(HttpResponse::Created().json(payload));
    }

    let storage = service.get_storage(request)?;

    let assignment = match storage.get_assignment_by_uid(&ingest.assignment_uid).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => {
            return Ok(bad_request(
                ErrorCode::AssignmentNotFound,
                format!("作业不存在: {}", ingest.assignment_uid),
            ));
        }
        Err(e) => return Ok(internal_error("查询作业失败", e)),
    };

    if !assignment.state.accepts_submissions() {
        return Ok(bad_request(
            ErrorCode::AssignmentNotAccepting,
            format!("作业当前状态为 {}，不接收提交", assignment.state),
        ));
    }

    let students = match storage.find_students_by_uids(&owner_uids).await {
        Ok(students) => students,
        Err(e) => return Ok(internal_error("查询提交学生失败", e)),
    };

    for uid in &owner_uids {
        if !students.iter().any(|s| &s.uid == uid) {
            warn!("提交中的所有者 {} 不存在，已忽略 (upstream={})", uid, ingest.upstream);
        }
    }

    if students.is_empty() {
        return Ok(bad_request(
            ErrorCode::StudentNotFound,
            "additional_data 中没有可识别的学生",
        ));
    }

    let commit_tag = ingest
        .commit_tag
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    let record = NewSubmissionRecord {
        commit_tag: commit_tag.clone(),
        assignment_id: assignment.id,
        student_ids: students.iter().map(|s| s.id).collect(),
        submission_time: now.timestamp_millis(),
        audit: SubmissionAudit::V1 {
            upstream: ingest.upstream.clone(),
            owner_uids: owner_uids.clone(),
            assignment_uid: assignment.uid.clone(),
            receive_time: now.timestamp(),
            payload: payload.clone(),
        },
    };

    // 先落库，再入队：队列中不会出现没有记录的信封
    let created = match storage.create_submission_record(record).await {
        Ok(created) => created,
        Err(e) if e.is_duplicate_submission() => {
            info!("重复投递的提交已忽略: commit_tag={}", commit_tag);
            return Ok(HttpResponse::Created().json(payload));
        }
        Err(e) => return Ok(internal_error("创建提交记录失败", e)),
    };

    let envelope = PendingEnvelope::new(PendingEvent {
        upstream: ingest.upstream,
        owner_uids,
        receive_time: now.timestamp(),
        record_id: created.id,
    });

    let push = event_store.push_envelope(&assignment.uid, &envelope);
    match tokio::time::timeout(Duration::from_millis(config.queue_timeout_ms), push).await {
        Ok(Ok(())) => {
            info!(
                "提交已接收: assignment={}, record_id={}, commit_tag={}",
                assignment.uid, created.id, created.commit_tag
            );
        }
        Ok(Err(e)) => {
            error!(
                "写入待评测队列失败 (record_id={}): {}",
                created.id, e
            );
        }
        Err(_) => {
            error!(
                "写入待评测队列超时 (record_id={}, {}ms)",
                created.id, config.queue_timeout_ms
            );
        }
    }

    Ok(HttpResponse::Created().json(payload))
}

/// 后台发布评测脚本推送通知，失败只记录日志
fn publish_grade_script_pushed(
    event_store: Arc<dyn EventStore>,
    config: &SubmissionConfig,
    notification: GradeScriptPushed,
) {
    let message = match serde_json::to_string(&notification) {
        Ok(message) => message,
        Err(e) => {
            error!("序列化评测脚本通知失败: {}", e);
            return;
        }
    };
    let channel = config.grade_script_channel.clone();
    let timeout = Duration::from_millis(config.publish_timeout_ms);

    actix_web::rt::spawn(async move {
        match tokio::time::timeout(timeout, event_store.publish(&channel, message)).await {
            Ok(Ok(())) => info!("评测脚本推送通知已发布: {}", notification.upstream),
            Ok(Err(e)) => error!("发布评测脚本通知失败: {}", e),
            Err(_) => error!("发布评测脚本通知超时 ({}ms)", timeout.as_millis()),
        }
    });
}
