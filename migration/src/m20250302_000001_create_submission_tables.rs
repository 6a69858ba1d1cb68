use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建提交记录表，commit_tag 全局唯一，作为幂等键
        manager
            .create_table(
                Table::create()
                    .table(SubmissionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionRecords::CommitTag)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionRecords::AssignmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionRecords::Grade)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(SubmissionRecords::Delta).double().null())
                    .col(
                        ColumnDef::new(SubmissionRecords::SubmissionTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionRecords::GradeTime)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionRecords::State)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(SubmissionRecords::Message).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(SubmissionRecords::Table, SubmissionRecords::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交记录与学生的多对多关联表（支持小组提交）
        manager
            .create_table(
                Table::create()
                    .table(SubmissionRecordStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionRecordStudents::RecordId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SubmissionRecordStudents::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SubmissionRecordStudents::RecordId)
                            .col(SubmissionRecordStudents::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                SubmissionRecordStudents::Table,
                                SubmissionRecordStudents::RecordId,
                            )
                            .to(SubmissionRecords::Table, SubmissionRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                SubmissionRecordStudents::Table,
                                SubmissionRecordStudents::StudentId,
                            )
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 排行榜按 (assignment_id, submission_time) 取每个学生最新记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submission_records_assignment_time")
                    .table(SubmissionRecords::Table)
                    .col(SubmissionRecords::AssignmentId)
                    .col(SubmissionRecords::SubmissionTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submission_record_students_student_id")
                    .table(SubmissionRecordStudents::Table)
                    .col(SubmissionRecordStudents::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(SubmissionRecordStudents::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(SubmissionRecords::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SubmissionRecords {
    #[sea_orm(iden = "submission_records")]
    Table,
    Id,
    CommitTag,
    AssignmentId,
    Grade,
    Delta,
    SubmissionTime,
    GradeTime,
    State,
    Message,
}

#[derive(DeriveIden)]
enum SubmissionRecordStudents {
    #[sea_orm(iden = "submission_record_students")]
    Table,
    RecordId,
    StudentId,
}

#[derive(DeriveIden)]
enum Assignments {
    #[sea_orm(iden = "assignments")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
}
