use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn create_is_idempotent_by_name() {
    let ctx = test_support::setup_test_context().await;
    let teacher = test_support::insert_teacher(ctx.state.db(), "mr_fox", &["Biology"]).await;

    let create = || {
        test_support::json_request(
            Method::POST,
            "/api/subjects/create",
            None,
            Some(json!({"name": "Biology", "teacher": teacher.id})),
        )
    };

    let response = ctx.app.clone().oneshot(create()).await.expect("first create");
    let status = response.status();
    let first = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {first}");

    let response = ctx.app.clone().oneshot(create()).await.expect("second create");
    let status = response.status();
    let second = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {second}");
    assert_eq!(first["id"], second["id"]);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/subjects", None, None))
        .await
        .expect("list");
    let body = test_support::read_json(response).await;
    assert_eq!(body[0]["teacher"]["username"], "mr_fox");
}

#[tokio::test]
async fn create_requires_name_and_teacher() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/subjects/create",
            None,
            Some(json!({"name": "History"})),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn teachers_are_found_by_taught_subject() {
    let ctx = test_support::setup_test_context().await;
    test_support::insert_teacher(ctx.state.db(), "a_teacher", &["Chemistry", "Physics"]).await;
    test_support::insert_teacher(ctx.state.db(), "b_teacher", &["History"]).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/subjects/teachers/physics",
            None,
            None,
        ))
        .await
        .expect("teachers");
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1), "response: {body}");
    assert_eq!(body[0]["username"], "a_teacher");
}

#[tokio::test]
async fn subject_names_are_unique_ignoring_case() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let math = test_support::insert_subject(db, "Math", None).await;

    let duplicate = repositories::subjects::create_if_absent(
        db,
        repositories::subjects::CreateSubject {
            id: &Uuid::new_v4().to_string(),
            name: "math",
            teacher_id: None,
            now: primitive_now_utc(),
        },
    )
    .await
    .expect("create subject");
    assert!(duplicate.is_none());

    let found = repositories::subjects::find_by_name(db, "MATH").await.expect("find subject");
    assert_eq!(found.map(|subject| subject.id), Some(math.id));
    assert_eq!(repositories::subjects::count(db).await.expect("count"), 1);
}
