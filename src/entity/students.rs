//! 学生实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uid: String,
    pub user_id: Option<i64>,
    #[sea_orm(unique)]
    pub enroll_email: String,
    pub student_id: String,
    pub name: String,
    pub nickname: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::course_students::Entity")]
    CourseStudents,
    #[sea_orm(has_many = "super::submission_record_students::Entity")]
    SubmissionRecordStudents,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::course_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseStudents.def()
    }
}

impl Related<super::submission_record_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubmissionRecordStudents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student(self) -> crate::models::students::entities::Student {
        crate::models::students::entities::Student {
            id: self.id,
            uid: self.uid,
            user_id: self.user_id,
            enroll_email: self.enroll_email,
            student_id: self.student_id,
            name: self.name,
            nickname: self.nickname,
        }
    }
}
