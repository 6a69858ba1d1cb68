//! 排行榜排序
//!
//! 有提交的学生按成绩降序、提交时间升序排列，其后是没有提交的学生；
//! 最终以学生 ID 升序保证结果确定。

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{
    students::entities::Student,
    submissions::{entities::LatestSubmission, responses::ScoreboardEntry},
};

struct Ranked {
    student_id: i64,
    latest: Option<LatestSubmission>,
    entry: ScoreboardEntry,
}

fn compare(a: &Ranked, b: &Ranked) -> Ordering {
    match (&a.latest, &b.latest) {
        (Some(la), Some(lb)) => lb
            .grade
            .total_cmp(&la.grade)
            .then(la.submission_time.cmp(&lb.submission_time)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(a.student_id.cmp(&b.student_id))
}

/// 合并花名册与最新提交，生成排序后的排行榜
///
/// 不在花名册中的提交被忽略；没有提交的学生得到 0 分、无提交时间的条目。
pub fn build_scoreboard(
    roster: Vec<Student>,
    latest: Vec<LatestSubmission>,
    overall_score: f64,
) -> Vec<ScoreboardEntry> {
    let mut latest_by_student: HashMap<i64, LatestSubmission> =
        latest.into_iter().map(|l| (l.student_id, l)).collect();

    let mut ranked: Vec<Ranked> = roster
        .into_iter()
        .map(|student| {
            let latest = latest_by_student.remove(&student.id);
            let entry = ScoreboardEntry {
                nickname: student.nickname,
                student_uid: student.uid,
                overall_score,
                score: latest.as_ref().map(|l| l.grade).unwrap_or(0.0),
                delta: latest.as_ref().and_then(|l| l.delta),
                submission_time: latest
                    .as_ref()
                    .and_then(|l| chrono::DateTime::from_timestamp_millis(l.submission_time)),
                submission_count: latest.as_ref().map(|l| l.submission_count).unwrap_or(0),
            };
            Ranked {
                student_id: student.id,
                latest,
                entry,
            }
        })
        .collect();

    ranked.sort_by(compare);
    ranked.into_iter().map(|r| r.entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: i64, nickname: &str) -> Student {
        Student {
            id,
            uid: format!("{nickname}-uid"),
            user_id: None,
            enroll_email: format!("{nickname}@example.com"),
            student_id: format!("S{id}"),
            name: nickname.to_string(),
            nickname: nickname.to_string(),
        }
    }

    fn latest(student_id: i64, grade: f64, time: i64, count: i64) -> LatestSubmission {
        LatestSubmission {
            student_id,
            record_id: student_id * 100,
            grade,
            delta: Some(0.0),
            submission_time: time,
            submission_count: count,
        }
    }

    fn nicknames(entries: &[ScoreboardEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.nickname.as_str()).collect()
    }

    #[test]
    fn test_score_descending() {
        let board = build_scoreboard(
            vec![student(1, "alice"), student(2, "bob")],
            vec![latest(1, 60.0, 1_000, 1), latest(2, 90.0, 2_000, 1)],
            100.0,
        );
        assert_eq!(nicknames(&board), vec!["bob", "alice"]);
    }

    #[test]
    fn test_equal_score_earlier_submission_wins() {
        let board = build_scoreboard(
            vec![student(1, "alice"), student(2, "bob")],
            vec![latest(1, 80.0, 5_000, 1), latest(2, 80.0, 3_000, 2)],
            100.0,
        );
        assert_eq!(nicknames(&board), vec!["bob", "alice"]);
    }

    #[test]
    fn test_no_submission_default_sorted_last() {
        let board = build_scoreboard(
            vec![student(1, "alice"), student(2, "bob"), student(3, "carol")],
            vec![latest(2, 0.0, 1_000, 1)],
            100.0,
        );
        assert_eq!(nicknames(&board), vec!["bob", "alice", "carol"]);

        let alice = &board[1];
        assert_eq!(alice.score, 0.0);
        assert_eq!(alice.overall_score, 100.0);
        assert!(alice.submission_time.is_none());
        assert!(alice.delta.is_none());
        assert_eq!(alice.submission_count, 0);
    }

    #[test]
    fn test_empty_submissions_yields_full_roster() {
        let roster: Vec<Student> = (1..=5).map(|i| student(i, &format!("s{i}"))).collect();
        let board = build_scoreboard(roster, vec![], 100.0);
        assert_eq!(board.len(), 5);
        assert!(board.iter().all(|e| e.score == 0.0 && e.submission_time.is_none()));
        assert_eq!(nicknames(&board), vec!["s1", "s2", "s3", "s4", "s5"]);
    }

    #[test]
    fn test_full_tie_broken_by_student_id() {
        let board = build_scoreboard(
            vec![student(2, "bob"), student(1, "alice")],
            vec![latest(1, 70.0, 1_000, 1), latest(2, 70.0, 1_000, 1)],
            100.0,
        );
        assert_eq!(nicknames(&board), vec!["alice", "bob"]);
    }

    #[test]
    fn test_entry_fields_from_latest() {
        let board = build_scoreboard(
            vec![student(1, "alice")],
            vec![latest(1, 75.5, 1_700_000_000_000, 3)],
            100.0,
        );
        let entry = &board[0];
        assert_eq!(entry.student_uid, "alice-uid");
        assert_eq!(entry.score, 75.5);
        assert_eq!(entry.submission_count, 3);
        assert_eq!(
            entry.submission_time.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }
}
