use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::UpdateAssignmentStateRequest;
use crate::services::{AssignmentService, HistoryService, PendingQueueService, ScoreboardService};
use crate::utils::{SafeAssignmentPath, SafeStudentAssignmentPath, SafeSubmissionPath};

// 懒加载的全局服务实例
static SCOREBOARD_SERVICE: Lazy<ScoreboardService> = Lazy::new(ScoreboardService::new_lazy);
static PENDING_QUEUE_SERVICE: Lazy<PendingQueueService> =
    Lazy::new(PendingQueueService::new_lazy);
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);
static HISTORY_SERVICE: Lazy<HistoryService> = Lazy::new(HistoryService::new_lazy);

// 作业排行榜
pub async fn get_scoreboard(req: HttpRequest, path: SafeAssignmentPath) -> ActixResult<HttpResponse> {
    SCOREBOARD_SERVICE
        .get_scoreboard(&req, &path.assignment_uid)
        .await
}

// 待评测队列
pub async fn list_pending(req: HttpRequest, path: SafeAssignmentPath) -> ActixResult<HttpResponse> {
    PENDING_QUEUE_SERVICE
        .list_pending(&req, &path.assignment_uid)
        .await
}

// 更新作业状态
pub async fn update_assignment_state(
    req: HttpRequest,
    path: SafeAssignmentPath,
    body: web::Json<UpdateAssignmentStateRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_state(&req, &path.assignment_uid, body.into_inner())
        .await
}

// 学生提交历史
pub async fn list_history(
    req: HttpRequest,
    path: SafeStudentAssignmentPath,
) -> ActixResult<HttpResponse> {
    HISTORY_SERVICE
        .list_history(&req, &path.assignment_uid, &path.student_uid)
        .await
}

// 学生单次提交详情
pub async fn get_history_record(
    req: HttpRequest,
    path: SafeSubmissionPath,
) -> ActixResult<HttpResponse> {
    HISTORY_SERVICE
        .get_history_record(&req, &path.assignment_uid, &path.student_uid, &path.commit_tag)
        .await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/course/{course_id}")
            .wrap(middleware::Compress::default())
            // 课程成员校验依赖 JWT 写入的用户，最后注册的中间件最先执行
            .wrap(middlewares::RequireCourseMember)
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("/assignment/{assignment_id}")
                    .route("/scores", web::get().to(get_scoreboard))
                    .route("/queue", web::get().to(list_pending))
                    .route("/state", web::put().to(update_assignment_state))
                    .route(
                        "/student/{student_uid}/history",
                        web::get().to(list_history),
                    )
                    .route(
                        "/student/{student_uid}/history/{commit_tag}",
                        web::get().to(get_history_record),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::models::{
        queue::entities::{PendingEnvelope, PendingEvent},
        submissions::entities::GradingUpdate,
        users::entities::User,
    };
    use crate::routes::test_support::{Fixture, init_app};

    fn get(uri: &str, user: &User) -> test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .insert_header(("Authorization", Fixture::bearer(user)))
    }

    fn put_state(uri: &str, user: &User, state: &str) -> test::TestRequest {
        test::TestRequest::put()
            .uri(uri)
            .insert_header(("Authorization", Fixture::bearer(user)))
            .set_json(json!({ "state": state }))
    }

    async fn grade(fixture: &Fixture, record_id: i64, grade: f64) {
        fixture
            .storage
            .apply_grading_update(record_id, GradingUpdate::Graded { grade })
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn test_requires_valid_jwt() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/course/C1/assignment/A1/scores")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/course/C1/assignment/A1/scores")
                .insert_header(("Authorization", "Bearer not-a-jwt"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_course_permission_and_lookup_failures() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        let cases = [
            ("/course/C1/assignment/A1/scores", &fixture.outsider_user, StatusCode::FORBIDDEN),
            ("/course/C1/assignment/A1/queue", &fixture.outsider_user, StatusCode::FORBIDDEN),
            ("/course/NOPE/assignment/A1/scores", &fixture.alice_user, StatusCode::NOT_FOUND),
            ("/course/C1/assignment/NOPE/scores", &fixture.alice_user, StatusCode::NOT_FOUND),
            // 作业属于另一门课程
            ("/course/C1/assignment/B1/scores", &fixture.alice_user, StatusCode::NOT_FOUND),
            ("/course/C2/assignment/B1/scores", &fixture.alice_user, StatusCode::FORBIDDEN),
            ("/course/C1/assignment/A1/scores", &fixture.teacher_user, StatusCode::OK),
        ];
        for (uri, user, expected) in cases {
            let resp = test::call_service(&app, get(uri, user).to_request()).await;
            assert_eq!(resp.status(), expected, "GET {uri} as {}", user.uid);
        }
    }

    #[actix_web::test]
    async fn test_scoreboard_ranking() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        let first = fixture.submit(&fixture.built, "alice-1", &[&fixture.alice], 1_000).await;
        grade(&fixture, first.id, 40.0).await;
        let second = fixture.submit(&fixture.built, "alice-2", &[&fixture.alice], 3_000).await;
        grade(&fixture, second.id, 80.0).await;
        let bob = fixture.submit(&fixture.built, "bob-1", &[&fixture.bob], 2_000).await;
        grade(&fixture, bob.id, 80.0).await;

        let resp = test::call_service(
            &app,
            get("/course/C1/assignment/A1/scores", &fixture.alice_user).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 3);

        // 同分时较早提交者在前，未提交者排在最后
        let order: Vec<&str> = entries
            .iter()
            .map(|e| e["student_uid"].as_str().unwrap())
            .collect();
        assert_eq!(order, vec!["bob", "alice", "carol"]);

        assert_eq!(entries[1]["score"], json!(80.0));
        assert_eq!(entries[1]["delta"], json!(40.0));
        assert_eq!(entries[1]["submission_count"], json!(2));
        assert_eq!(entries[1]["overall_score"], json!(100.0));
        assert_eq!(entries[1]["nickname"], json!("Alice"));

        assert_eq!(entries[2]["score"], json!(0.0));
        assert_eq!(entries[2]["submission_count"], json!(0));
        assert!(entries[2]["delta"].is_null());
        assert!(entries[2]["submission_time"].is_null());
    }

    #[actix_web::test]
    async fn test_scoreboard_ignores_records_until_built() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        let record = fixture.submit(&fixture.created, "early", &[&fixture.alice], 1_000).await;
        grade(&fixture, record.id, 100.0).await;

        let resp = test::call_service(
            &app,
            get("/course/C1/assignment/A0/scores", &fixture.bob_user).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e["submission_count"] == json!(0)));
    }

    #[actix_web::test]
    async fn test_queue_viewer_renders_submitters() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        for (record_id, owners, receive_time) in [
            (2, vec!["bob"], 1_700_000_200),
            (1, vec!["alice", "ghost"], 1_700_000_100),
        ] {
            let envelope = PendingEnvelope::new(PendingEvent {
                upstream: "git@host/repo.git".to_string(),
                owner_uids: owners.into_iter().map(String::from).collect(),
                receive_time,
                record_id,
            });
            fixture.event_store.push_envelope("A1", &envelope).await.unwrap();
        }
        fixture
            .event_store
            .push("A1", "garbage".to_string(), 1_700_000_300)
            .await
            .unwrap();

        let resp = test::call_service(
            &app,
            get("/course/C1/assignment/A1/queue", &fixture.teacher_user).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["submitter"], json!("Alice, unknown"));
        assert_eq!(entries[1]["submitter"], json!("Bob"));

        // 查看队列不会修改队列
        assert_eq!(fixture.event_store.range("A1").await.unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_assignment_state_transitions() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);
        let uri = "/course/C1/assignment/A0/state";

        let resp = test::call_service(
            &app,
            put_state(uri, &fixture.alice_user, "finished").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = test::call_service(
            &app,
            put_state(uri, &fixture.teacher_user, "built").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        for next in ["finished", "BUILT"] {
            let resp = test::call_service(
                &app,
                put_state(uri, &fixture.teacher_user, next).to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::OK, "transition to {next}");
        }

        let resp = test::call_service(
            &app,
            put_state(uri, &fixture.teacher_user, "disabled").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["state"], json!("disabled"));

        // 停用后不可恢复
        let resp = test::call_service(
            &app,
            put_state(uri, &fixture.teacher_user, "built").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let assignment = fixture.storage.get_assignment_by_uid("A0").await.unwrap().unwrap();
        assert_eq!(assignment.state.as_str(), "disabled");
    }

    #[actix_web::test]
    async fn test_submission_history_access() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        let older = fixture.submit(&fixture.built, "hist-1", &[&fixture.alice], 1_000).await;
        grade(&fixture, older.id, 50.0).await;
        fixture.submit(&fixture.built, "hist-2", &[&fixture.alice], 2_000).await;

        let uri = "/course/C1/assignment/A1/student/alice/history";
        for user in [&fixture.alice_user, &fixture.teacher_user] {
            let resp = test::call_service(&app, get(uri, user).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            let tags: Vec<&str> = body["data"]
                .as_array()
                .unwrap()
                .iter()
                .map(|r| r["commit_tag"].as_str().unwrap())
                .collect();
            assert_eq!(tags, vec!["hist-2", "hist-1"]);
        }

        let resp = test::call_service(&app, get(uri, &fixture.bob_user).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = test::call_service(
            &app,
            get(
                "/course/C1/assignment/A1/student/nobody/history",
                &fixture.teacher_user,
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
    #[actix_web::test]
    async fn test_single_submission_lookup() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        let record = fixture.submit(&fixture.built, "abc123", &[&fixture.alice], 1_000).await;
        grade(&fixture, record.id, 70.0).await;
        fixture.submit(&fixture.built, "bob-only", &[&fixture.bob], 2_000).await;
        fixture.submit(&fixture.created, "other-assignment", &[&fixture.alice], 3_000).await;

        let base = "/course/C1/assignment/A1/student/alice/history";
        let resp = test::call_service(
            &app,
            get(&format!("{base}/abc123"), &fixture.alice_user).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["commit_tag"], json!("abc123"));
        assert_eq!(body["data"]["grade"], json!(70.0));
        assert_eq!(body["data"]["overall_score"], json!(100.0));

        // 其他学生的提交、其他作业的提交与不存在的提交都返回 404
        for tag in ["bob-only", "other-assignment", "missing"] {
            let resp = test::call_service(
                &app,
                get(&format!("{base}/{tag}"), &fixture.teacher_user).to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "commit {tag}");
        }

        let resp = test::call_service(
            &app,
            get(&format!("{base}/abc123"), &fixture.bob_user).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_unlinked_student_history_visible_to_instructor_only() {
        let fixture = Fixture::new().await;
        let app = init_app!(fixture);

        fixture.submit(&fixture.built, "carol-1", &[&fixture.carol], 1_000).await;
        let uri = format!(
            "/course/C1/assignment/A1/student/{}/history",
            fixture.carol.uid
        );

        let resp = test::call_service(&app, get(&uri, &fixture.teacher_user).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert!(body["data"][0]["grade_time"].is_null());

        // 没有关联账号的学生不会被任何调用者视为本人
        for user in [&fixture.alice_user, &fixture.bob_user] {
            let resp = test::call_service(&app, get(&uri, user).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }
    }
}
