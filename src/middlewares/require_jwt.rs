/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <JWT>`，`sub` 为调用者的用户 uid。
 * 通过后将 `User` 写入请求扩展，供课程权限中间件与处理程序使用。
 *
 * ```rust,ignore
 * web::scope("/course")
 *     .wrap(RequireJWT)
 *     .route("/{course_id}/assignment/{assignment_id}/scores", web::get().to(get_scores))
 * ```
 *
 * 令牌对应的用户缓存在对象缓存中（键 `user:<token>`），有效期为 `cache.default_ttl`。
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::{CacheConfig, JwtConfig};
use crate::models::{ErrorCode, users::entities};
use crate::storage::Storage;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

enum AuthFailure {
    Unauthorized(String),
    Internal(String),
}

// 辅助函数：提取并验证 JWT
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<entities::User, AuthFailure> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AuthFailure::Unauthorized("Missing or invalid Authorization header".into()))?;

    let jwt_config = req
        .app_data::<web::Data<JwtConfig>>()
        .ok_or_else(|| AuthFailure::Internal("JwtConfig not found in app data".into()))?;

    let claims =
        crate::utils::jwt::JwtUtils::verify_token(token, &jwt_config.secret).map_err(|err| {
            info!("JWT token validation failed: {}", err);
            AuthFailure::Unauthorized("Invalid JWT token".into())
        })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .ok_or_else(|| AuthFailure::Internal("Cache not found in app data".into()))?
        .get_ref()
        .clone();

    let cache_key = format!("user:{token}");

    // 从缓存中获取用户信息
    match cache.get_raw(&cache_key).await {
        CacheResult::Found(json) => match serde_json::from_str::<entities::User>(&json) {
            Ok(user) if user.uid == claims.sub => return Ok(user),
            _ => {
                cache.remove(&cache_key).await;
                info!("Discarding unusable cached user for token");
            }
        },
        _ => {
            debug!("User not found in cache for token");
        }
    };

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .ok_or_else(|| AuthFailure::Internal("Storage not found in app data".into()))?
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_uid(&claims.sub)
        .await
        .map_err(|e| AuthFailure::Internal(format!("Failed to retrieve user: {e}")))?
        .ok_or_else(|| AuthFailure::Unauthorized("User not found".into()))?;

    if !user.is_active {
        return Err(AuthFailure::Unauthorized("User is not active".into()));
    }

    // 将用户信息存入缓存
    let ttl = req
        .app_data::<web::Data<CacheConfig>>()
        .map(|c| c.default_ttl)
        .unwrap_or(0);
    if let Ok(user_json) = serde_json::to_string(&user) {
        cache.insert_raw(cache_key, user_json, ttl).await;
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
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
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for user: {}", user.uid);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(AuthFailure::Unauthorized(err)) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
                Err(AuthFailure::Internal(err)) => {
                    error!("JWT authentication error for {}: {}", req.path(), err);
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Internal server error",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取用户信息
impl RequireJWT {
    /// 从请求扩展中提取用户
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_user(req: &actix_web::HttpRequest) -> Option<entities::User> {
        req.extensions().get::<entities::User>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<entities::User>().map(|user| user.id)
    }
}
