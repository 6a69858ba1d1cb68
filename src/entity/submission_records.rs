//! 提交记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submission_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub commit_tag: String,
    pub assignment_id: i64,
    pub grade: f64,
    pub delta: Option<f64>,
    pub submission_time: i64,
    pub grade_time: i64,
    pub state: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignments::Entity",
        from = "Column::AssignmentId",
        to = "super::assignments::Column::Id"
    )]
    Assignment,
    #[sea_orm(has_many = "super::submission_record_students::Entity")]
    SubmissionRecordStudents,
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl Related<super::submission_record_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubmissionRecordStudents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission_record(
        self,
        student_ids: Vec<i64>,
    ) -> crate::models::submissions::entities::SubmissionRecord {
        use crate::models::submissions::entities::{SubmissionRecord, SubmissionState};

        SubmissionRecord {
            id: self.id,
            commit_tag: self.commit_tag,
            assignment_id: self.assignment_id,
            student_ids,
            grade: self.grade,
            delta: self.delta,
            submission_time: self.submission_time,
            grade_time: self.grade_time,
            state: SubmissionState::from_code(self.state).unwrap_or(SubmissionState::Failed),
            message: self.message,
        }
    }
}
