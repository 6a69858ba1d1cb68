/*!
 * 课程成员访问控制中间件
 *
 * 必须在 RequireJWT 之后使用。按路径中的 `course_id`（课程 uid）查找课程：
 * 课程不存在返回 404，调用者既不是已选课学生也不是课程教师返回 403。
 * 通过后将 `Course` 与 `CourseMembership` 写入请求扩展。
 *
 * ```rust,ignore
 * web::scope("/course/{course_id}")
 *     .wrap(RequireCourseMember)
 *     .wrap(RequireJWT)
 * ```
 */

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
use tracing::{debug, error};

use super::create_error_response;
use crate::models::{
    ErrorCode,
    courses::entities::{Course, CourseMembership},
    users::entities::User,
};
use crate::storage::Storage;
use crate::utils::validate::validate_uid;

#[derive(Clone)]
pub struct RequireCourseMember;

impl<S, B> Transform<S, ServiceRequest> for RequireCourseMember
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireCourseMemberMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireCourseMemberMiddleware {
            service: Rc::new(service),
        }))
    }
}

fn reject<B>(
    req: ServiceRequest,
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    Ok(req.into_response(create_error_response(status, code, message).map_into_right_body()))
}

pub struct RequireCourseMemberMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireCourseMemberMiddleware<S>
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
            // 1. 校验用户信息
            let user = req.extensions().get::<User>().cloned();
            let Some(user) = user else {
                return reject(
                    req,
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    "Unauthorized: missing user",
                );
            };

            // 2. 校验 course_id
            let course_uid = req.match_info().get("course_id").unwrap_or_default().to_string();
            if validate_uid(&course_uid).is_err() {
                return reject(
                    req,
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    "Missing or invalid course_id",
                );
            }

            let Some(storage) = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|s| s.get_ref().clone())
            else {
                error!("Storage not found in app data");
                return reject(
                    req,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Internal server error",
                );
            };

            // 3. 查询课程
            let course: Course = match storage.get_course_by_uid(&course_uid).await {
                Ok(Some(course)) => course,
                Ok(None) => {
                    return reject(
                        req,
                        StatusCode::NOT_FOUND,
                        ErrorCode::CourseNotFound,
                        "Course not found",
                    );
                }
                Err(e) => {
                    error!("查询课程失败: {}", e);
                    return reject(
                        req,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Internal server error",
                    );
                }
            };

            // 4. 查询课程身份
            let membership: CourseMembership =
                match storage.get_course_membership(course.id, user.id).await {
                    Ok(membership) => membership,
                    Err(e) => {
                        error!("查询课程成员失败: {}", e);
                        return reject(
                            req,
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorCode::InternalServerError,
                            "Internal server error",
                        );
                    }
                };

            if !membership.can_read() {
                return reject(
                    req,
                    StatusCode::FORBIDDEN,
                    ErrorCode::CoursePermissionDenied,
                    "No permission for this course",
                );
            }

            debug!("User {} is a member of course {}", user.uid, course.uid);
            req.extensions_mut().insert(course);
            req.extensions_mut().insert(membership);
            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}

// 辅助函数：从请求中提取课程信息
impl RequireCourseMember {
    /// 此函数应该在应用了RequireCourseMember中间件的路由处理程序中使用
    pub fn extract_course(req: &actix_web::HttpRequest) -> Option<Course> {
        req.extensions().get::<Course>().cloned()
    }

    pub fn extract_membership(req: &actix_web::HttpRequest) -> Option<CourseMembership> {
        req.extensions().get::<CourseMembership>().copied()
    }
}
