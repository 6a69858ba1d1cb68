//! 花名册导入
//!
//! 课程、学生、教师与作业的增删改由外部管理端完成，这里只提供导入所需的最小写入接口。

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{course_instructors, course_students};
use crate::errors::{OJSystemError, Result};
use crate::models::{
    assignments::entities::{Assignment, AssignmentState},
    courses::entities::Course,
    students::entities::Student,
    users::entities::User,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

/// 新课程
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub uid: String,
    pub code: String,
    pub name: String,
    pub year: i32,
    pub semester: String,
    pub homepage: Option<String>,
}

/// 新学生
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub uid: String,
    pub user_id: Option<i64>,
    pub enroll_email: String,
    pub student_id: String,
    pub name: String,
    pub nickname: String,
}

/// 新作业
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub uid: String,
    pub course_id: i64,
    pub name: String,
    pub short_name: String,
    pub grade: f64,
    pub deadline: i64,
    pub release_date: i64,
    pub state: AssignmentState,
}

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user(&self, uid: &str, email: &str, name: &str) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = UserActiveModel {
            uid: Set(uid.to_string()),
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("创建用户失败: {e}")))?;

        Ok(result.into_user())
    }

    /// 创建学生
    pub async fn create_student(&self, student: NewStudent) -> Result<Student> {
        let model = StudentActiveModel {
            uid: Set(student.uid),
            user_id: Set(student.user_id),
            enroll_email: Set(student.enroll_email),
            student_id: Set(student.student_id),
            name: Set(student.name),
            nickname: Set(student.nickname),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("创建学生失败: {e}")))?;

        Ok(result.into_student())
    }

    /// 创建教师，返回教师 ID
    pub async fn create_instructor(
        &self,
        user_id: Option<i64>,
        enroll_email: &str,
        name: &str,
    ) -> Result<i64> {
        let model = InstructorActiveModel {
            user_id: Set(user_id),
            enroll_email: Set(enroll_email.to_string()),
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("创建教师失败: {e}")))?;

        Ok(result.id)
    }

    /// 创建课程
    pub async fn create_course(&self, course: NewCourse) -> Result<Course> {
        let model = CourseActiveModel {
            uid: Set(course.uid),
            code: Set(course.code),
            name: Set(course.name),
            year: Set(course.year),
            semester: Set(course.semester),
            homepage: Set(course.homepage),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 学生加入课程
    pub async fn enroll_student(&self, course_id: i64, student_id: i64) -> Result<()> {
        let model = course_students::ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            joined_at: Set(chrono::Utc::now().timestamp()),
        };

        CourseStudents::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("加入课程失败: {e}")))?;

        Ok(())
    }

    /// 为课程指定教师
    pub async fn add_course_instructor(&self, course_id: i64, instructor_id: i64) -> Result<()> {
        let model = course_instructors::ActiveModel {
            course_id: Set(course_id),
            instructor_id: Set(instructor_id),
        };

        CourseInstructors::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("指定课程教师失败: {e}")))?;

        Ok(())
    }

    /// 创建作业
    pub async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = AssignmentActiveModel {
            uid: Set(assignment.uid),
            course_id: Set(assignment.course_id),
            name: Set(assignment.name),
            short_name: Set(assignment.short_name),
            descr_link: Set(None),
            grade: Set(assignment.grade),
            deadline: Set(assignment.deadline),
            release_date: Set(assignment.release_date),
            state: Set(assignment.state.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("创建作业失败: {e}")))?;

        Ok(result.into_assignment())
    }
}
