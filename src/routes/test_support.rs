//! 路由测试共用的内存环境：SQLite 内存库、进程内队列与 Moka 缓存

use std::sync::Arc;

use crate::cache::{ObjectCache, object_cache::moka::MokaCacheWrapper};
use crate::config::{CacheConfig, JwtConfig, MemoryConfig, RedisConfig, SubmissionConfig};
use crate::models::{
    assignments::entities::{Assignment, AssignmentState},
    courses::entities::Course,
    students::entities::Student,
    submissions::entities::{NewSubmissionRecord, SubmissionAudit, SubmissionRecord},
    users::entities::User,
};
use crate::queue::{EventStore, memory::MemoryEventStore};
use crate::storage::{
    Storage,
    sea_orm_storage::{NewAssignment, NewCourse, NewStudent, SeaOrmStorage},
};
use crate::utils::jwt::JwtUtils;

pub(crate) const SUBMISSION_TOKEN: &str = "middleware-shared-secret";
pub(crate) const JWT_SECRET: &str = "test-jwt-secret";

pub(crate) struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub queue: Arc<MemoryEventStore>,
    pub event_store: Arc<dyn EventStore>,
    pub cache: Arc<dyn ObjectCache>,
    pub submission: SubmissionConfig,
    pub jwt: JwtConfig,
    pub cache_config: CacheConfig,
    pub course: Course,
    /// 已构建，接收提交
    pub built: Assignment,
    /// 刚创建，不接收提交
    pub created: Assignment,
    pub alice: Student,
    pub bob: Student,
    /// 没有关联账号的学生
    pub carol: Student,
    pub alice_user: User,
    pub bob_user: User,
    pub teacher_user: User,
    pub outsider_user: User,
}

fn new_course(uid: &str) -> NewCourse {
    NewCourse {
        uid: uid.to_string(),
        code: format!("CS-{uid}"),
        name: format!("Course {uid}"),
        year: 2026,
        semester: "fall".to_string(),
        homepage: None,
    }
}

fn new_student(uid: &str, user_id: Option<i64>, nickname: &str) -> NewStudent {
    NewStudent {
        uid: uid.to_string(),
        user_id,
        enroll_email: format!("{uid}@example.com"),
        student_id: format!("S-{uid}"),
        name: nickname.to_string(),
        nickname: nickname.to_string(),
    }
}

fn new_assignment(uid: &str, course_id: i64, state: AssignmentState) -> NewAssignment {
    NewAssignment {
        uid: uid.to_string(),
        course_id,
        name: format!("Assignment {uid}"),
        short_name: uid.to_lowercase(),
        grade: 100.0,
        deadline: 1_800_000_000,
        release_date: 1_700_000_000,
        state,
    }
}

impl Fixture {
    pub async fn new() -> Self {
        let db = Arc::new(SeaOrmStorage::in_memory().await.unwrap());

        let alice_user = db.create_user("alice-user", "alice@users.example.com", "Alice").await.unwrap();
        let bob_user = db.create_user("bob-user", "bob@users.example.com", "Bob").await.unwrap();
        let teacher_user = db
            .create_user("teacher-user", "teacher@users.example.com", "Teacher")
            .await
            .unwrap();
        let outsider_user = db
            .create_user("outsider-user", "outsider@users.example.com", "Outsider")
            .await
            .unwrap();

        let course = db.create_course(new_course("C1")).await.unwrap();
        let other_course = db.create_course(new_course("C2")).await.unwrap();

        let alice = db
            .create_student(new_student("alice", Some(alice_user.id), "Alice"))
            .await
            .unwrap();
        let bob = db
            .create_student(new_student("bob", Some(bob_user.id), "Bob"))
            .await
            .unwrap();
        let carol = db.create_student(new_student("carol", None, "Carol")).await.unwrap();
        for student in [&alice, &bob, &carol] {
            db.enroll_student(course.id, student.id).await.unwrap();
        }

        let instructor_id = db
            .create_instructor(Some(teacher_user.id), "teacher@example.com", "Teacher")
            .await
            .unwrap();
        db.add_course_instructor(course.id, instructor_id).await.unwrap();

        let built = db
            .create_assignment(new_assignment("A1", course.id, AssignmentState::Built))
            .await
            .unwrap();
        let created = db
            .create_assignment(new_assignment("A0", course.id, AssignmentState::Created))
            .await
            .unwrap();
        // 属于另一门课程的作业
        db.create_assignment(new_assignment("B1", other_course.id, AssignmentState::Built))
            .await
            .unwrap();

        let queue = Arc::new(MemoryEventStore::new(""));
        let cache_config = CacheConfig {
            cache_type: "moka".to_string(),
            default_ttl: 60,
            redis: RedisConfig {
                url: String::new(),
                key_prefix: String::new(),
            },
            memory: MemoryConfig { max_capacity: 100 },
        };

        Self {
            storage: db,
            event_store: queue.clone(),
            queue,
            cache: Arc::new(MokaCacheWrapper::new(100, 60)),
            submission: SubmissionConfig {
                token: SUBMISSION_TOKEN.to_string(),
                grading_script_suffix: "_grading_script.git".to_string(),
                grade_script_channel: "grade_script_pushed".to_string(),
                queue_timeout_ms: 1000,
                publish_timeout_ms: 1000,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
                access_token_expiry: 60,
            },
            cache_config,
            course,
            built,
            created,
            alice,
            bob,
            carol,
            alice_user,
            bob_user,
            teacher_user,
            outsider_user,
        }
    }

    pub fn bearer(user: &User) -> String {
        let token =
            JwtUtils::generate_token(&user.uid, JWT_SECRET, chrono::Duration::hours(1)).unwrap();
        format!("Bearer {token}")
    }

    /// 直接写入一条提交记录，`submission_time` 为毫秒
    pub async fn submit(
        &self,
        assignment: &Assignment,
        commit_tag: &str,
        owners: &[&Student],
        submission_time: i64,
    ) -> SubmissionRecord {
        self.storage
            .create_submission_record(NewSubmissionRecord {
                commit_tag: commit_tag.to_string(),
                assignment_id: assignment.id,
                student_ids: owners.iter().map(|s| s.id).collect(),
                submission_time,
                audit: SubmissionAudit::V1 {
                    upstream: format!("git@host/{commit_tag}.git"),
                    owner_uids: owners.iter().map(|s| s.uid.clone()).collect(),
                    assignment_uid: assignment.uid.clone(),
                    receive_time: submission_time / 1000,
                    payload: serde_json::json!({}),
                },
            })
            .await
            .unwrap()
    }
}

/// 按生产环境的方式组装应用
macro_rules! init_app {
    ($fixture:expr) => {{
        let fixture = &$fixture;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(crate::utils::json_error_handler),
                )
                .app_data(actix_web::web::Data::new(fixture.storage.clone()))
                .app_data(actix_web::web::Data::new(fixture.event_store.clone()))
                .app_data(actix_web::web::Data::new(fixture.cache.clone()))
                .app_data(actix_web::web::Data::new(fixture.submission.clone()))
                .app_data(actix_web::web::Data::new(fixture.jwt.clone()))
                .app_data(actix_web::web::Data::new(fixture.cache_config.clone()))
                .configure(crate::routes::configure_internal_routes)
                .configure(crate::routes::configure_course_routes),
        )
        .await
    }};
}

pub(crate) use init_app;
