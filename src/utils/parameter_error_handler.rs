use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

/// JSON 请求体解析失败时返回 400，不暴露内部细节
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON 参数错误 {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type 必须为 application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "请求体过大".to_string()
        }
        JsonPayloadError::Deserialize(e) => format!("请求体格式错误: {e}"),
        _ => "请求体格式错误".to_string(),
    };
    InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

/// 查询参数解析失败时返回 400
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("查询参数错误 {}: {}", req.path(), err);
    InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            "查询参数格式错误",
        )),
    )
    .into()
}
