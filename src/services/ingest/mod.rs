pub mod grading;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::config::SubmissionConfig;
use crate::models::submissions::requests::GradingResultRequest;
use crate::storage::Storage;

pub struct IngestService {
    storage: Option<Arc<dyn Storage>>,
}

impl IngestService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from(&self.storage, request)
    }

    pub(crate) fn get_config(&self, request: &HttpRequest) -> ActixResult<SubmissionConfig> {
        request
            .app_data::<web::Data<SubmissionConfig>>()
            .map(|c| c.get_ref().clone())
            .ok_or_else(|| actix_web::error::ErrorInternalServerError("Internal server error"))
    }

    /// 接收中间件推送的提交通知
    pub async fn ingest_submission(
        &self,
        request: &HttpRequest,
        payload: serde_json::Value,
    ) -> ActixResult<HttpResponse> {
        submit::ingest_submission(self, request, payload).await
    }

    /// 接收评测机回写的评测结果
    pub async fn record_grading_result(
        &self,
        request: &HttpRequest,
        body: GradingResultRequest,
    ) -> ActixResult<HttpResponse> {
        grading::record_grading_result(self, request, body).await
    }
}
