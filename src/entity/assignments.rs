//! 作业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub uid: String,
    pub course_id: i64,
    pub name: String,
    pub short_name: String,
    pub descr_link: Option<String>,
    pub grade: f64,
    pub deadline: i64,
    pub release_date: i64,
    pub state: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::submission_records::Entity")]
    SubmissionRecords,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::submission_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubmissionRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_assignment(self) -> crate::models::assignments::entities::Assignment {
        use crate::models::assignments::entities::{Assignment, AssignmentState};
        use chrono::{DateTime, Utc};

        Assignment {
            id: self.id,
            uid: self.uid,
            course_id: self.course_id,
            name: self.name,
            short_name: self.short_name,
            descr_link: self.descr_link,
            grade: self.grade,
            deadline: DateTime::<Utc>::from_timestamp(self.deadline, 0).unwrap_or_default(),
            release_date: DateTime::<Utc>::from_timestamp(self.release_date, 0)
                .unwrap_or_default(),
            state: self
                .state
                .parse::<AssignmentState>()
                .unwrap_or(AssignmentState::Disabled),
        }
    }
}
