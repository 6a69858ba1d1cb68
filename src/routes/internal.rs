use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::submissions::requests::GradingResultRequest;
use crate::services::IngestService;

// 懒加载的全局 IngestService 实例
static INGEST_SERVICE: Lazy<IngestService> = Lazy::new(IngestService::new_lazy);

// 接收提交通知（请求体原样回显，先按通用 JSON 解析）
pub async fn ingest_submission(
    req: HttpRequest,
    body: web::Json<serde_json::Value>,
) -> ActixResult<HttpResponse> {
    INGEST_SERVICE
        .ingest_submission(&req, body.into_inner())
        .await
}

// 接收评测结果
pub async fn record_grading_result(
    req: HttpRequest,
    body: web::Json<GradingResultRequest>,
) -> ActixResult<HttpResponse> {
    INGEST_SERVICE
        .record_grading_result(&req, body.into_inner())
        .await
}

// 配置路由
pub fn configure_internal_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/internal")
            .wrap(middlewares::RequireSubmissionToken)
            .route("/submission", web::post().to(ingest_submission))
            .route("/grading", web::post().to(record_grading_result)),
    );
}
