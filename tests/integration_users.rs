#![cfg(feature = "integration-tests")]

mod common;

use axum::http::StatusCode;
use common::{
    create_test_class, create_test_school, create_test_user, generate_unique_email,
    get_auth_token, make_class_admin, send, setup_test_app,
};
use scholaris::scholaris_models::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_school_admin_creates_accounts_in_own_school(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let other = create_test_school(&pool, "Southside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": generate_unique_email(),
            "password": "password123",
            "role": "student",
            "school_id": other,
            "class_id": class
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["school_id"], school);
    assert_eq!(body["class_id"], class);
    assert!(body.get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_super_admin_accounts_cannot_be_created_over_http(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;
    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &root).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "first_name": "Root",
            "last_name": "Two",
            "email": generate_unique_email(),
            "password": "password123",
            "role": "super_admin",
            "school_id": school
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_is_a_conflict(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "first_name": "Dup",
            "last_name": "User",
            "email": admin.email,
            "password": "password123",
            "role": "teacher"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivating_teacher_releases_class_and_subjects(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;
    make_class_admin(&pool, teacher.id, class).await;
    sqlx::query("INSERT INTO subjects (name, class_id, school_id, teacher_id) VALUES ('Math', $1, $2, $3)")
        .bind(class)
        .bind(school)
        .bind(teacher.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}", teacher.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_active"], false);

    let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM class_admin_profiles")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(admins, 0);

    let taught: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE teacher_id IS NOT NULL")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(taught, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_users_of_other_schools_are_invisible(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let other = create_test_school(&pool, "Southside").await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let stranger = create_test_user(&pool, Role::Teacher, Some(other), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{}", stranger.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
}
