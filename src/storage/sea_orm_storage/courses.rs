use super::SeaOrmStorage;
use crate::entity::course_instructors::{
    Column as CourseInstructorColumn, Entity as CourseInstructors,
};
use crate::entity::course_students::{Column as CourseStudentColumn, Entity as CourseStudents};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::instructors::Column as InstructorColumn;
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::errors::{OJSystemError, Result};
use crate::models::{
    courses::entities::{Course, CourseMembership},
    students::entities::Student,
};
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};

impl SeaOrmStorage {
    /// 通过 uid 获取课程
    pub async fn get_course_by_uid_impl(&self, uid: &str) -> Result<Option<Course>> {
        let result = Courses::find()
            .filter(CourseColumn::Uid.eq(uid))
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 查询用户在课程中的学生/教师身份
    pub async fn get_course_membership_impl(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<CourseMembership> {
        let enrolled = CourseStudents::find()
            .join(
                JoinType::InnerJoin,
                crate::entity::course_students::Relation::Student.def(),
            )
            .filter(CourseStudentColumn::CourseId.eq(course_id))
            .filter(StudentColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询课程学生失败: {e}")))?;

        let teaching = CourseInstructors::find()
            .join(
                JoinType::InnerJoin,
                crate::entity::course_instructors::Relation::Instructor.def(),
            )
            .filter(CourseInstructorColumn::CourseId.eq(course_id))
            .filter(InstructorColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询课程教师失败: {e}")))?;

        Ok(CourseMembership {
            is_student: enrolled > 0,
            is_instructor: teaching > 0,
        })
    }

    /// 课程花名册，按学生 ID 升序
    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<Student>> {
        let students = Students::find()
            .inner_join(CourseStudents)
            .filter(CourseStudentColumn::CourseId.eq(course_id))
            .order_by_asc(StudentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询课程花名册失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }

    /// 通过 uid 获取学生
    pub async fn get_student_by_uid_impl(&self, uid: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(StudentColumn::Uid.eq(uid))
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 批量通过 uid 获取学生
    pub async fn find_students_by_uids_impl(&self, uids: &[String]) -> Result<Vec<Student>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }

        let students = Students::find()
            .filter(StudentColumn::Uid.is_in(uids.iter().cloned()))
            .order_by_asc(StudentColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("批量查询学生失败: {e}")))?;

        Ok(students.into_iter().map(|m| m.into_student()).collect())
    }
}
