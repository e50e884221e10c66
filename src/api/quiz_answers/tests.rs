use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn submit_ignores_client_score_and_upserts() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let student = test_support::insert_student(db, "jo", &["Math"], &[]).await;
    let quiz = test_support::insert_quiz(db, "Decimals", None, None, None, &[1, 0, 2, 3]).await;

    let submit = |answers: serde_json::Value| {
        test_support::json_request(
            Method::POST,
            "/api/quiz-answer/submit",
            None,
            Some(json!({
                "quizId": quiz.id,
                "studentId": student.id,
                "answers": answers,
                "score": 100
            })),
        )
    };

    let response = ctx
        .app
        .clone()
        .oneshot(submit(json!({"0": 1, "1": 0, "2": 1, "3": 3})))
        .await
        .expect("submit");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["score"], 75);
    assert_eq!(body["correct_answers"], 3);
    assert_eq!(body["total_questions"], 4);

    let response = ctx.app.clone().oneshot(submit(json!([1, 0, 2, 3]))).await.expect("resubmit");
    let body = test_support::read_json(response).await;
    assert_eq!(body["score"], 100);

    let count = repositories::quiz_answers::count_for_quiz_student(db, &quiz.id, &student.id)
        .await
        .expect("count");
    assert_eq!(count, 1);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/quiz-answer/{}/{}", quiz.id, student.id),
            None,
            None,
        ))
        .await
        .expect("review");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["quiz"]["title"], "Decimals");
    assert_eq!(body["student"]["username"], "jo");
    assert_eq!(body["answers"][3]["is_correct"], true);
    assert_eq!(body["score"], 100);
}

#[tokio::test]
async fn submit_rejects_unknown_quiz_or_student() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let student = test_support::insert_student(db, "kai", &[], &[]).await;
    let quiz = test_support::insert_quiz(db, "Any", None, None, None, &[0]).await;

    for (quiz_id, student_id) in [("nope", student.id.as_str()), (quiz.id.as_str(), "nobody")] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/quiz-answer/submit",
                None,
                Some(json!({"quizId": quiz_id, "studentId": student_id, "answers": [0]})),
            ))
            .await
            .expect("submit");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/quiz-answer/submit",
            None,
            Some(json!({"answers": [0]})),
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/quiz-answer/{}/{}", quiz.id, student.id),
            None,
            None,
        ))
        .await
        .expect("review");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings_and_dashboard_reflect_attempts() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();
    let teacher = test_support::insert_teacher(db, "ms_lee", &["Chemistry"]).await;
    let student = test_support::insert_student(db, "max", &["Chemistry"], &[&teacher.id]).await;
    let chemistry = test_support::insert_subject(db, "Chemistry", Some(&teacher.id)).await;
    let subject_id = Some(chemistry.id.as_str());
    let teacher_id = Some(teacher.id.as_str());
    let first = test_support::insert_quiz(db, "Atoms", subject_id, teacher_id, None, &[0, 1]).await;
    let second = test_support::insert_quiz(db, "Bonds", subject_id, teacher_id, None, &[2]).await;
    test_support::insert_quiz(db, "Reactions", Some(&chemistry.id), None, None, &[0]).await;

    for (quiz_id, answers) in [(&first.id, json!([0, 0])), (&second.id, json!([2]))] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/quiz-answer/submit",
                None,
                Some(json!({"quizId": quiz_id, "studentId": student.id, "answers": answers})),
            ))
            .await
            .expect("submit");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/quiz-answer/student/{}", student.id),
            None,
            None,
        ))
        .await
        .expect("answers");
    let body = test_support::read_json(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2), "response: {body}");
    assert_eq!(body[0]["quiz"]["subject"], "Chemistry");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/quiz-answer/quiz/{}/results", first.id),
            None,
            None,
        ))
        .await
        .expect("quiz results");
    let body = test_support::read_json(response).await;
    assert_eq!(body[0]["student"]["username"], "max");
    assert_eq!(body[0]["quiz_title"], "Atoms");
    assert_eq!(body[0]["score"], 50);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/quiz-answer/student/{}/dashboard", student.id),
            None,
            None,
        ))
        .await
        .expect("dashboard");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["total_completed"], 2);
    assert_eq!(body["total_upcoming"], 1);
    assert_eq!(body["upcoming"][0]["title"], "Reactions");
    assert_eq!(body["average_score"], 75);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/quiz-answer/student/nobody/dashboard",
            None,
            None,
        ))
        .await
        .expect("dashboard");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
