//! HTTP-level tests for the admin session catalog and RBAC.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, assert_error, body_json, create_session, date_from_today, delete_auth, get,
    get_auth, hhmm, post_json_auth, put_json_auth, student_token,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_session_returns_201_with_deadline(pool: PgPool) {
    let date = date_from_today(7);
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/sessions",
        json!({"date": date, "name": "Ca sáng", "start_time": "09:00", "end_time": "11:00"}),
        &admin_token(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Ca sáng");
    assert_eq!(json["data"]["start_time"], "09:00");
    assert_eq!(json["data"]["is_deleted"], false);
    let deadline = json["data"]["registration_deadline"].as_str().unwrap();
    assert!(deadline.starts_with(&format!("{date}T07:00:00")), "got {deadline}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fourth_session_returns_capacity_exceeded(pool: PgPool) {
    let date = date_from_today(7);
    for h in [7, 10, 14] {
        create_session(&pool, date, (h, 0), (h + 2, 0), None).await;
    }

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/sessions",
        json!({"date": date, "name": "Ca tối", "start_time": "18:00", "end_time": "20:00"}),
        &admin_token(),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "CAPACITY_EXCEEDED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_before_start_is_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/sessions",
        json!({
            "date": date_from_today(3),
            "name": "Ngược giờ",
            "start_time": "11:00",
            "end_time": "09:00",
        }),
        &admin_token(),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_class_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/sessions",
        json!({
            "date": date_from_today(3),
            "name": "Lớp lạ",
            "start_time": "08:00",
            "end_time": "09:00",
            "training_class_id": 999_999,
        }),
        &admin_token(),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_date_orders_by_start(pool: PgPool) {
    let date = date_from_today(5);
    create_session(&pool, date, (14, 0), (16, 0), None).await;
    create_session(&pool, date, (8, 0), (10, 0), None).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/admin/sessions?date={date}"),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let sessions = json["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["start_time"], hhmm(8, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_session(pool: PgPool) {
    let date = date_from_today(5);
    let id = create_session(&pool, date, (8, 0), (10, 0), None).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/sessions/{id}"),
        json!({"name": "Đổi tên", "end_time": "10:30"}),
        &admin_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Đổi tên");
    assert_eq!(json["data"]["end_time"], "10:30");
    assert_eq!(json["data"]["start_time"], "08:00");

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/sessions/{id}"), &admin_token()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/admin/sessions/{id}"), &admin_token()).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/admin/sessions?date={date}"),
        &admin_token(),
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_into_full_date_is_rejected(pool: PgPool) {
    let full = date_from_today(6);
    for h in [7, 10, 14] {
        create_session(&pool, full, (h, 0), (h + 2, 0), None).await;
    }
    let id = create_session(&pool, date_from_today(8), (7, 0), (9, 0), None).await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/sessions/{id}"),
        json!({"date": full}),
        &admin_token(),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "CAPACITY_EXCEEDED").await;
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/admin/sessions/today").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_student_cannot_manage_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/sessions",
        json!({"date": date_from_today(3), "name": "x", "start_time": "08:00", "end_time": "09:00"}),
        &student_token(42),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_cannot_register_as_student(pool: PgPool) {
    let id = create_session(&pool, date_from_today(3), (8, 0), (9, 0), None).await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{id}/register"),
        json!({}),
        &admin_token(),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/attendance/me", "not-a-jwt").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}
