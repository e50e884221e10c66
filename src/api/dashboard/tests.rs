use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn stats_and_groupings_count_users() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let ada = test_support::insert_teacher(db, "ada", &["Math", "Physics"]).await;
    test_support::insert_teacher(db, "bob", &["Math"]).await;
    test_support::insert_student(db, "cy", &["Math"], &[]).await;
    test_support::insert_student(db, "di", &["Physics", "Math"], &[]).await;
    test_support::insert_subject(db, "Math", Some(&ada.id)).await;

    let get = |uri: &str| test_support::json_request(Method::GET, uri, None, None);

    let response = ctx.app.clone().oneshot(get("/api/dashboard/stats")).await.expect("stats");
    let body = test_support::read_json(response).await;
    assert_eq!(body, json!({"students": 2, "teachers": 2, "subjects": 1}));

    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/dashboard/students-per-subject"))
        .await
        .expect("students per subject");
    let body = test_support::read_json(response).await;
    assert_eq!(body[0]["name"], "Math", "response: {body}");
    assert_eq!(body[0]["student_count"], 2);
    assert_eq!(body[1]["name"], "Physics");
    assert_eq!(body[1]["students"][0]["username"], "di");

    let response = ctx
        .app
        .clone()
        .oneshot(get("/api/dashboard/teachers-per-subject"))
        .await
        .expect("teachers per subject");
    let body = test_support::read_json(response).await;
    assert_eq!(body[0]["subject"], "Math", "response: {body}");
    assert_eq!(body[0]["teacher_count"], 2);
    assert_eq!(body[1]["subject"], "Physics");
    assert_eq!(body[1]["teacher_count"], 1);
}

#[tokio::test]
async fn student_subjects_pair_teachers_and_quiz_stats() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "eve", &["Math"]).await;
    let student = test_support::insert_student(db, "fay", &["Math", "Art"], &[&teacher.id]).await;
    let math = test_support::insert_subject(db, "Math", Some(&teacher.id)).await;
    let graded = test_support::insert_quiz(db, "Sums", Some(&math.id), None, None, &[0, 0]).await;
    test_support::insert_quiz(db, "Products", Some(&math.id), None, None, &[0]).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/quiz/{}/submit", graded.id),
            None,
            Some(json!({"studentId": student.id, "answers": [0, 1]})),
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/dashboard/student/{}/subjects", student.id),
            None,
            None,
        ))
        .await
        .expect("subjects");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["student"]["username"], "fay");

    let math = &body["subjects"][0];
    assert_eq!(math["subject"], "Math");
    assert_eq!(math["teacher"]["username"], "eve");
    assert_eq!(math["completed_quizzes"], 1);
    assert_eq!(math["average_score"], 50);
    assert_eq!(math["total_quizzes"], 2);

    let art = &body["subjects"][1];
    assert!(art["teacher"].is_null());
    assert_eq!(art["total_quizzes"], 0);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/dashboard/student/{}/subjects", teacher.id),
            None,
            None,
        ))
        .await
        .expect("subjects");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
