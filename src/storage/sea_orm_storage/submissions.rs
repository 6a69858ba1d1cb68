use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::submission_record_students::{
    self, Column as RecordStudentColumn, Entity as SubmissionRecordStudents,
};
use crate::entity::submission_records::{ActiveModel, Column, Entity as SubmissionRecords, Model};
use crate::errors::{OJSystemError, Result};
use crate::models::submissions::entities::{
    GradingUpdate, NewSubmissionRecord, SubmissionRecord, SubmissionState,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};

/// 区分 commit_tag 冲突与其他数据库错误
fn map_insert_error(err: DbErr, commit_tag: &str) -> OJSystemError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            OJSystemError::duplicate_submission(format!("commit_tag 已存在: {commit_tag}"))
        }
        _ => OJSystemError::database_operation(format!("创建提交记录失败: {err}")),
    }
}

impl SeaOrmStorage {
    /// 创建提交记录与学生关联（同一事务）
    pub async fn create_submission_record_impl(
        &self,
        record: NewSubmissionRecord,
    ) -> Result<SubmissionRecord> {
        let mut student_ids = record.student_ids;
        student_ids.sort_unstable();
        student_ids.dedup();
        if student_ids.is_empty() {
            return Err(OJSystemError::validation("提交记录至少需要一个学生"));
        }

        let message = record.audit.to_json()?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| OJSystemError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            commit_tag: Set(record.commit_tag.clone()),
            assignment_id: Set(record.assignment_id),
            grade: Set(0.0),
            delta: Set(Some(0.0)),
            submission_time: Set(record.submission_time),
            grade_time: Set(0),
            state: Set(SubmissionState::Received.code()),
            message: Set(Some(message)),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| map_insert_error(e, &record.commit_tag))?;

        let links = student_ids
            .iter()
            .map(|student_id| submission_record_students::ActiveModel {
                record_id: Set(inserted.id),
                student_id: Set(*student_id),
            });

        SubmissionRecordStudents::insert_many(links)
            .exec_without_returning(&txn)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("关联提交学生失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| map_insert_error(e, &record.commit_tag))?;

        Ok(inserted.into_submission_record(student_ids))
    }

    /// 通过 commit_tag 获取提交记录
    pub async fn get_submission_record_by_commit_tag_impl(
        &self,
        commit_tag: &str,
    ) -> Result<Option<SubmissionRecord>> {
        let result = SubmissionRecords::find()
            .filter(Column::CommitTag.eq(commit_tag))
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询提交记录失败: {e}")))?;

        match result {
            Some(model) => {
                let student_ids = self.get_record_student_ids(&self.db, model.id).await?;
                Ok(Some(model.into_submission_record(student_ids)))
            }
            None => Ok(None),
        }
    }

    /// 写入评测结果
    ///
    /// 评测完成时 delta 为本次成绩减去同一作业、任一相同所有者、
    /// 提交时间更早的最近一次已评测记录的成绩；不存在时为空。
    pub async fn apply_grading_update_impl(
        &self,
        record_id: i64,
        update: GradingUpdate,
    ) -> Result<Option<SubmissionRecord>> {
        let existing = SubmissionRecords::find_by_id(record_id)
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询提交记录失败: {e}")))?;

        let Some(model) = existing else {
            return Ok(None);
        };

        let student_ids = self.get_record_student_ids(&self.db, model.id).await?;
        let now = chrono::Utc::now().timestamp_millis();

        let mut active: ActiveModel = model.clone().into();
        active.state = Set(update.state().code());

        match update {
            GradingUpdate::Grading => {}
            GradingUpdate::Graded { grade } => {
                let previous = self.find_previous_graded(&model, &student_ids).await?;
                active.grade = Set(grade);
                active.delta = Set(previous.map(|p| grade - p.grade));
                active.grade_time = Set(now);
            }
            GradingUpdate::Failed => {
                active.grade = Set(0.0);
                active.grade_time = Set(now);
            }
        }

        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("更新评测结果失败: {e}")))?;

        Ok(Some(updated.into_submission_record(student_ids)))
    }

    /// 某学生在作业下的全部提交，新到旧
    pub async fn list_student_submission_records_impl(
        &self,
        assignment_id: i64,
        student_id: i64,
    ) -> Result<Vec<SubmissionRecord>> {
        let models = SubmissionRecords::find()
            .inner_join(SubmissionRecordStudents)
            .filter(Column::AssignmentId.eq(assignment_id))
            .filter(RecordStudentColumn::StudentId.eq(student_id))
            .order_by_desc(Column::SubmissionTime)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询提交历史失败: {e}")))?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        // 批量查询所有者
        let record_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let links = SubmissionRecordStudents::find()
            .filter(RecordStudentColumn::RecordId.is_in(record_ids))
            .all(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询提交学生失败: {e}")))?;

        let mut owners: HashMap<i64, Vec<i64>> = HashMap::new();
        for link in links {
            owners.entry(link.record_id).or_default().push(link.student_id);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let mut ids = owners.remove(&m.id).unwrap_or_default();
                ids.sort_unstable();
                m.into_submission_record(ids)
            })
            .collect())
    }

    async fn get_record_student_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        record_id: i64,
    ) -> Result<Vec<i64>> {
        SubmissionRecordStudents::find()
            .filter(RecordStudentColumn::RecordId.eq(record_id))
            .select_only()
            .column(RecordStudentColumn::StudentId)
            .order_by_asc(RecordStudentColumn::StudentId)
            .into_tuple::<i64>()
            .all(conn)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询提交学生失败: {e}")))
    }

    async fn find_previous_graded(
        &self,
        record: &Model,
        student_ids: &[i64],
    ) -> Result<Option<Model>> {
        if student_ids.is_empty() {
            return Ok(None);
        }

        SubmissionRecords::find()
            .inner_join(SubmissionRecordStudents)
            .filter(Column::AssignmentId.eq(record.assignment_id))
            .filter(Column::Id.ne(record.id))
            .filter(Column::State.eq(SubmissionState::Graded.code()))
            .filter(Column::SubmissionTime.lt(record.submission_time))
            .filter(RecordStudentColumn::StudentId.is_in(student_ids.iter().copied()))
            .order_by_desc(Column::SubmissionTime)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询上次评测记录失败: {e}")))
    }
}
