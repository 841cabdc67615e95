#![cfg(feature = "integration-tests")]

mod common;

use axum::http::StatusCode;
use common::{
    create_test_class, create_test_school, create_test_user, get_auth_token, make_class_admin,
    send, setup_test_app,
};
use scholaris::scholaris_models::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_with_wrong_password_is_rejected(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let user = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_user_cannot_log_in(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let user = create_test_user(&pool, Role::Teacher, Some(school), None).await;
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = setup_test_app(pool);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": common::PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_session_reports_class_admin_as_effective_role(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;
    make_class_admin(&pool, teacher.id, class).await;

    let app = setup_test_app(pool);
    let token = get_auth_token(&app, &teacher).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requester"]["role"], "teacher");
    assert_eq!(body["requester"]["class_admin_of"], class);
    assert_eq!(body["effective_role"], "class_admin");
    assert_eq!(body["tier"], "class");

    let titles: Vec<&str> = body["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"My class"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_requests_without_token_are_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool);
    let (status, _) = send(&app, "GET", "/api/classes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
