#![cfg(feature = "integration-tests")]

mod common;

use axum::http::StatusCode;
use common::{
    create_test_class, create_test_school, create_test_user, get_auth_token, send, setup_test_app,
};
use scholaris::scholaris_models::Role;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_second_teacher_cannot_take_administered_class(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class = create_test_class(&pool, "Class 6", Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let first = create_test_user(&pool, Role::Teacher, Some(school), None).await;
    let second = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/class-admins",
        Some(&token),
        Some(json!({ "teacher_id": first.id, "class_id": class })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/class-admins",
        Some(&token),
        Some(json!({ "teacher_id": second.id, "class_id": class })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "This class already has a class admin");

    // Unassigning the first teacher frees the class.
    let (status, _) = send(
        &app,
        "PUT",
        "/api/class-admins",
        Some(&token),
        Some(json!({ "teacher_id": first.id, "class_id": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/class-admins",
        Some(&token),
        Some(json!({ "teacher_id": second.id, "class_id": class })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["teacher_id"], second.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reassigning_teacher_moves_the_assignment(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let class_6 = create_test_class(&pool, "Class 6", Some(school)).await;
    let class_7 = create_test_class(&pool, "Class 7", Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    for class in [class_6, class_7] {
        let (status, _) = send(
            &app,
            "PUT",
            "/api/class-admins",
            Some(&token),
            Some(json!({ "teacher_id": teacher.id, "class_id": class })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let rows: Vec<i64> =
        sqlx::query_scalar("SELECT class_id FROM class_admin_profiles WHERE user_id = $1")
            .bind(teacher.id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(rows, vec![class_7]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_class_from_another_school_is_rejected(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let other = create_test_school(&pool, "Southside").await;
    let foreign_class = create_test_class(&pool, "Class 6", Some(other)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/class-admins",
        Some(&token),
        Some(json!({ "teacher_id": teacher.id, "class_id": foreign_class })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_assignable_classes_hide_classes_of_other_admins(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let taken = create_test_class(&pool, "Class 6", Some(school)).await;
    let free = create_test_class(&pool, "Class 7", Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;
    let holder = create_test_user(&pool, Role::Teacher, Some(school), None).await;
    let teacher = create_test_user(&pool, Role::Teacher, Some(school), None).await;
    common::make_class_admin(&pool, holder.id, taken).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let uri = format!("/api/class-admins/assignable-classes?teacher_id={}", teacher.id);
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![free]);
}
