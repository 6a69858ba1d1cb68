/*!
 * 内部接口共享密钥校验
 *
 * 仓库中间件与评测机调用 `/internal` 下的接口时在 `Authorization` 头中携带共享密钥，
 * 可以是裸密钥，也可以是 `Bearer <密钥>`。校验失败返回 401 并记录来源地址。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{error, warn};

use super::create_error_response;
use crate::config::SubmissionConfig;
use crate::models::ErrorCode;
use crate::utils::validate::secure_compare;

const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone)]
pub struct RequireSubmissionToken;

/// 从 Authorization 头中取出密钥
fn presented_token(req: &ServiceRequest) -> Option<String> {
    let raw = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())?
        .trim();
    let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RequireSubmissionToken
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireSubmissionTokenMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSubmissionTokenMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireSubmissionTokenMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSubmissionTokenMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            let Some(config) = req.app_data::<web::Data<SubmissionConfig>>().cloned() else {
                error!("SubmissionConfig not found in app data");
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Internal server error",
                    )
                    .map_into_right_body(),
                ));
            };

            let authorized = !config.token.is_empty()
                && presented_token(&req)
                    .map(|token| secure_compare(&token, &config.token))
                    .unwrap_or(false);

            if authorized {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let remote = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();
            warn!(
                "Rejected internal request to {} from {}: invalid submission token",
                req.path(),
                remote
            );

            Ok(req.into_response(
                create_error_response(
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    "Unauthorized: invalid submission token",
                )
                .map_into_right_body(),
            ))
        })
    }
}
