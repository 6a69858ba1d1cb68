use super::SeaOrmStorage;
use crate::errors::{OJSystemError, Result};
use crate::models::submissions::entities::LatestSubmission;
use crate::utils::sql::placeholder;
use sea_orm::{FromQueryResult, Statement, Value};

#[derive(Debug, FromQueryResult)]
struct LatestSubmissionRow {
    student_id: i64,
    record_id: i64,
    grade: f64,
    delta: Option<f64>,
    submission_time: i64,
    submission_count: i64,
}

impl From<LatestSubmissionRow> for LatestSubmission {
    fn from(row: LatestSubmissionRow) -> Self {
        LatestSubmission {
            student_id: row.student_id,
            record_id: row.record_id,
            grade: row.grade,
            delta: row.delta,
            submission_time: row.submission_time,
            submission_count: row.submission_count,
        }
    }
}

impl SeaOrmStorage {
    /// 课程中每个学生在作业下的最新提交与提交次数
    ///
    /// 单条窗口函数查询：按学生分区，`submission_time DESC, id DESC` 取第一行。
    pub async fn list_latest_submissions_impl(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<LatestSubmission>> {
        let backend = self.db.get_database_backend();
        let sql = format!(
            r#"SELECT student_id, record_id, grade, delta, submission_time, submission_count
FROM (
    SELECT
        rs.student_id AS student_id,
        r.id AS record_id,
        r.grade AS grade,
        r.delta AS delta,
        r.submission_time AS submission_time,
        ROW_NUMBER() OVER (
            PARTITION BY rs.student_id
            ORDER BY r.submission_time DESC, r.id DESC
        ) AS rn,
        COUNT(*) OVER (PARTITION BY rs.student_id) AS submission_count
    FROM submission_records r
    INNER JOIN submission_record_students rs ON rs.record_id = r.id
    INNER JOIN course_students cs ON cs.student_id = rs.student_id AND cs.course_id = {}
    WHERE r.assignment_id = {}
) latest
WHERE rn = 1
ORDER BY student_id"#,
            placeholder(backend, 1),
            placeholder(backend, 2),
        );

        let stmt = Statement::from_sql_and_values(
            backend,
            sql,
            [Value::from(course_id), Value::from(assignment_id)],
        );

        let rows = LatestSubmissionRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(|e| OJSystemError::database_operation(format!("查询最新提交失败: {e}")))?;

        Ok(rows.into_iter().map(LatestSubmission::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{NewAssignment, NewCourse, NewStudent, SeaOrmStorage};
    use crate::models::assignments::entities::AssignmentState;
    use crate::models::submissions::entities::{
        GradingUpdate, NewSubmissionRecord, SubmissionAudit, SubmissionState,
    };
    use crate::storage::Storage;

    struct Fixture {
        storage: SeaOrmStorage,
        course_id: i64,
        assignment_id: i64,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let storage = SeaOrmStorage::in_memory().await.unwrap();
        let course = storage
            .create_course(NewCourse {
                uid: "C1".to_string(),
                code: "CS100".to_string(),
                name: "Intro".to_string(),
                year: 2025,
                semester: "spring".to_string(),
                homepage: None,
            })
            .await
            .unwrap();
        let assignment = storage
            .create_assignment(NewAssignment {
                uid: "A1".to_string(),
                course_id: course.id,
                name: "Lab 1".to_string(),
                short_name: "lab1".to_string(),
                grade: 100.0,
                deadline: 1_900_000_000,
                release_date: 1_700_000_000,
                state: AssignmentState::Built,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let student = storage
                .create_student(NewStudent {
                    uid: format!("{name}-uid"),
                    user_id: None,
                    enroll_email: format!("{name}@example.com"),
                    student_id: format!("{name}-sid"),
                    name: name.to_string(),
                    nickname: name.to_string(),
                })
                .await
                .unwrap();
            storage.enroll_student(course.id, student.id).await.unwrap();
            ids.push(student.id);
        }

        Fixture {
            storage,
            course_id: course.id,
            assignment_id: assignment.id,
            alice: ids[0],
            bob: ids[1],
        }
    }

    fn record(tag: &str, assignment_id: i64, students: Vec<i64>, time: i64) -> NewSubmissionRecord {
        NewSubmissionRecord {
            commit_tag: tag.to_string(),
            assignment_id,
            student_ids: students,
            submission_time: time,
            audit: SubmissionAudit::V1 {
                upstream: "git@host/course/a1/repo.git".to_string(),
                owner_uids: vec![],
                assignment_uid: "A1".to_string(),
                receive_time: time / 1000,
                payload: serde_json::Value::Null,
            },
        }
    }

    #[tokio::test]
    async fn test_latest_submission_per_student() {
        let f = fixture().await;
        f.storage
            .create_submission_record(record("t1", f.assignment_id, vec![f.alice], 1_000))
            .await
            .unwrap();
        let second = f
            .storage
            .create_submission_record(record("t2", f.assignment_id, vec![f.alice], 2_000))
            .await
            .unwrap();

        let latest = f
            .storage
            .list_latest_submissions(f.course_id, f.assignment_id)
            .await
            .unwrap();

        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].student_id, f.alice);
        assert_eq!(latest[0].record_id, second.id);
        assert_eq!(latest[0].submission_time, 2_000);
        assert_eq!(latest[0].submission_count, 2);
    }

    #[tokio::test]
    async fn test_equal_submission_time_prefers_later_insert() {
        let f = fixture().await;
        f.storage
            .create_submission_record(record("t1", f.assignment_id, vec![f.alice], 5_000))
            .await
            .unwrap();
        let later = f
            .storage
            .create_submission_record(record("t2", f.assignment_id, vec![f.alice], 5_000))
            .await
            .unwrap();

        let latest = f
            .storage
            .list_latest_submissions(f.course_id, f.assignment_id)
            .await
            .unwrap();
        assert_eq!(latest[0].record_id, later.id);
    }

    #[tokio::test]
    async fn test_group_submission_counts_for_every_owner() {
        let f = fixture().await;
        f.storage
            .create_submission_record(record("g1", f.assignment_id, vec![f.alice, f.bob], 1_000))
            .await
            .unwrap();

        let latest = f
            .storage
            .list_latest_submissions(f.course_id, f.assignment_id)
            .await
            .unwrap();
        let students: Vec<i64> = latest.iter().map(|l| l.student_id).collect();
        assert_eq!(students, vec![f.alice, f.bob]);
        assert!(latest.iter().all(|l| l.submission_count == 1));
    }

    #[tokio::test]
    async fn test_duplicate_commit_tag_is_distinct_error() {
        let f = fixture().await;
        f.storage
            .create_submission_record(record("dup", f.assignment_id, vec![f.alice], 1_000))
            .await
            .unwrap();
        let err = f
            .storage
            .create_submission_record(record("dup", f.assignment_id, vec![f.alice], 2_000))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_submission());

        let latest = f
            .storage
            .list_latest_submissions(f.course_id, f.assignment_id)
            .await
            .unwrap();
        assert_eq!(latest[0].submission_count, 1);
    }

    #[tokio::test]
    async fn test_graded_delta_against_previous_graded() {
        let f = fixture().await;
        let first = f
            .storage
            .create_submission_record(record("t1", f.assignment_id, vec![f.alice], 1_000))
            .await
            .unwrap();
        let second = f
            .storage
            .create_submission_record(record("t2", f.assignment_id, vec![f.alice], 2_000))
            .await
            .unwrap();

        let graded_first = f
            .storage
            .apply_grading_update(first.id, GradingUpdate::Graded { grade: 60.0 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graded_first.state, SubmissionState::Graded);
        assert_eq!(graded_first.delta, None);
        assert!(graded_first.grade_time > 0);

        let graded_second = f
            .storage
            .apply_grading_update(second.id, GradingUpdate::Graded { grade: 85.0 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graded_second.delta, Some(25.0));
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let f = fixture().await;
        for (tag, time) in [("t1", 1_000), ("t2", 3_000), ("t3", 2_000)] {
            f.storage
                .create_submission_record(record(tag, f.assignment_id, vec![f.alice], time))
                .await
                .unwrap();
        }

        let history = f
            .storage
            .list_student_submission_records(f.assignment_id, f.alice)
            .await
            .unwrap();
        let tags: Vec<&str> = history.iter().map(|r| r.commit_tag.as_str()).collect();
        assert_eq!(tags, vec!["t2", "t3", "t1"]);
        assert!(history.iter().all(|r| r.student_ids == vec![f.alice]));

        let empty = f
            .storage
            .list_student_submission_records(f.assignment_id, f.bob)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
