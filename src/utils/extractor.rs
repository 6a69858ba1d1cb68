//! 路径参数提取器，在进入服务层前校验 uid 格式

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_uid;

fn path_segment(req: &HttpRequest, name: &str) -> Result<String, actix_web::Error> {
    let value = req.match_info().get(name).unwrap_or_default();
    validate_uid(value).map_err(|msg| {
        InternalError::from_response(
            format!("invalid path parameter {name}"),
            HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("路径参数 {name} 无效: {msg}"),
            )),
        )
    })?;
    Ok(value.to_string())
}

/// `/course/{course_id}/assignment/{assignment_id}`
#[derive(Debug, Clone)]
pub struct SafeAssignmentPath {
    pub course_uid: String,
    pub assignment_uid: String,
}

impl FromRequest for SafeAssignmentPath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}

impl SafeAssignmentPath {
    fn extract(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        Ok(SafeAssignmentPath {
            course_uid: path_segment(req, "course_id")?,
            assignment_uid: path_segment(req, "assignment_id")?,
        })
    }
}

/// `/course/{course_id}/assignment/{assignment_id}/student/{student_uid}`
#[derive(Debug, Clone)]
pub struct SafeStudentAssignmentPath {
    pub course_uid: String,
    pub assignment_uid: String,
    pub student_uid: String,
}

impl FromRequest for SafeStudentAssignmentPath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}

impl SafeStudentAssignmentPath {
    fn extract(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        Ok(SafeStudentAssignmentPath {
            course_uid: path_segment(req, "course_id")?,
            assignment_uid: path_segment(req, "assignment_id")?,
            student_uid: path_segment(req, "student_uid")?,
        })
    }
}

/// `/course/{course_id}/assignment/{assignment_id}/student/{student_uid}/history/{commit_tag}`
#[derive(Debug, Clone)]
pub struct SafeSubmissionPath {
    pub course_uid: String,
    pub assignment_uid: String,
    pub student_uid: String,
    pub commit_tag: String,
}

impl FromRequest for SafeSubmissionPath {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}

impl SafeSubmissionPath {
    fn extract(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        Ok(SafeSubmissionPath {
            course_uid: path_segment(req, "course_id")?,
            assignment_uid: path_segment(req, "assignment_id")?,
            student_uid: path_segment(req, "student_uid")?,
            commit_tag: path_segment(req, "commit_tag")?,
        })
    }
}
