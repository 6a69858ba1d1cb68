use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use tracing::warn;

use super::PendingQueueService;
use crate::models::{
    ApiResponse,
    queue::entities::PendingEvent,
    students::entities::Student,
    submissions::responses::QueueEntry,
};
use crate::services::{course_context, event_store_from, find_course_assignment, internal_error};

const UNKNOWN_SUBMITTER: &str = "unknown";

pub async fn list_pending(
    service: &PendingQueueService,
    request: &HttpRequest,
    assignment_uid: &str,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let event_store = event_store_from(request)?;

    let (course, _) = match course_context(request) {
        Ok(context) => context,
        Err(response) => return Ok(response),
    };

    let assignment = match find_course_assignment(&storage, &course, assignment_uid).await {
        Ok(assignment) => assignment,
        Err(response) => return Ok(response),
    };

    let events: Vec<PendingEvent> = match event_store.list_envelopes(&assignment.uid).await {
        Ok(envelopes) => envelopes.into_iter().map(|e| e.into_event()).collect(),
        Err(e) => return Ok(internal_error("读取待评测队列失败", e)),
    };

    let mut owner_uids: Vec<String> = events
        .iter()
        .flat_map(|event| event.owner_uids.iter().cloned())
        .collect();
    owner_uids.sort();
    owner_uids.dedup();

    let students = if owner_uids.is_empty() {
        Vec::new()
    } else {
        match storage.find_students_by_uids(&owner_uids).await {
            Ok(students) => students,
            Err(e) => return Ok(internal_error("查询提交者失败", e)),
        }
    };

    let entries = render_entries(events, students);
    Ok(HttpResponse::Ok().json(ApiResponse::success(entries, "查询成功")))
}

/// 将队列事件转换为展示条目，无法解析的提交者以占位符代替
fn render_entries(events: Vec<PendingEvent>, students: Vec<Student>) -> Vec<QueueEntry> {
    let nicknames: HashMap<String, String> = students
        .into_iter()
        .map(|student| (student.uid, student.nickname))
        .collect();

    events
        .into_iter()
        .map(|event| {
            let submitter = event
                .owner_uids
                .iter()
                .map(|uid| match nicknames.get(uid) {
                    Some(nickname) => nickname.as_str(),
                    None => {
                        warn!(
                            "队列事件 {} 的提交者 {} 无法解析",
                            event.record_id, uid
                        );
                        UNKNOWN_SUBMITTER
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            QueueEntry {
                submitter,
                submission_time: chrono::DateTime::from_timestamp(event.receive_time, 0)
                    .unwrap_or_default(),
            }
        })
        .collect()
}
