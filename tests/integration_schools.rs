#![cfg(feature = "integration-tests")]

mod common;

use axum::http::StatusCode;
use common::{
    create_test_class, create_test_school, create_test_subject, create_test_user,
    get_auth_token, send, setup_test_app,
};
use scholaris::scholaris_models::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_super_admin_deletes_school_without_content(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    create_test_class(&pool, "Class 6", Some(school)).await;
    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &root).await;
    let uri = format!("/api/schools/{school}");

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_school_with_deleted_homework_is_kept(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let subject = create_test_subject(&pool, "Math", class, Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;

    let app = setup_test_app(pool.clone());
    let admin_token = get_auth_token(&app, &admin).await;
    let root_token = get_auth_token(&app, &root).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/homework",
        Some(&admin_token),
        Some(json!({ "title": "Fractions", "class_id": class, "subject_id": subject })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/homework/{}", body["id"]);
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/schools/{school}"),
        Some(&root_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let kept: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM homework WHERE school_id = $1")
        .bind(school)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(kept, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_school_admin_cannot_delete_school(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/schools/{school}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
