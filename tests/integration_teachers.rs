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

async fn taught_by(pool: &PgPool, teacher_id: i64) -> Vec<i64> {
    sqlx::query_scalar("SELECT id FROM subjects WHERE teacher_id = $1 ORDER BY id")
        .bind(teacher_id)
        .fetch_all(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subject_assignment_replaces_the_whole_set(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let math = create_test_subject(&pool, "Math", class, Some(school)).await;
    let english = create_test_subject(&pool, "English", class, Some(school)).await;
    let science = create_test_subject(&pool, "Science", class, Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;
    let uri = format!("/api/teachers/{}/subjects", teacher.id);

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "subject_ids": [math, science, english] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "subject_ids": [math, english] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(taught_by(&pool, teacher.id).await, vec![math, english]);
    }

    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "subject_ids": [] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(taught_by(&pool, teacher.id).await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subject_of_another_school_rolls_back_the_assignment(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let other = create_test_school(&pool, "Southside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let math = create_test_subject(&pool, "Math", class, Some(school)).await;
    let foreign_class = create_test_class(&pool, "Class 6", Some(other)).await;
    let foreign = create_test_subject(&pool, "Math", foreign_class, Some(other)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;
    let uri = format!("/api/teachers/{}/subjects", teacher.id);

    let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "subject_ids": [math] }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "subject_ids": [foreign] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(taught_by(&pool, teacher.id).await, vec![math]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_cannot_assign_subjects(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let math = create_test_subject(&pool, "Math", class, Some(school)).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &teacher).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/teachers/{}/subjects", teacher.id),
        Some(&token),
        Some(json!({ "subject_ids": [math] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleted_class_retires_its_subjects(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let math = create_test_subject(&pool, "Math", class, Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;
    let uri = format!("/api/teachers/{}/subjects", teacher.id);

    let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "subject_ids": [math] }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/classes/{class}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(taught_by(&pool, teacher.id).await.is_empty());

    let (status, body) = send(&app, "GET", "/api/subjects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 0);

    let (status, _) = send(&app, "PUT", &uri, Some(&token), Some(json!({ "subject_ids": [math] }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(taught_by(&pool, teacher.id).await.is_empty());
}
