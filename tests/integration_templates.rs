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

async fn count_named(pool: &PgPool, table: &str, name: &str, school: i64) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE name = $1 AND school_id = $2 AND is_active"
    ))
    .bind(name)
    .bind(school)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_assign_template_copies_class_and_subjects_once(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &root).await;

    let (status, class) = send(
        &app,
        "POST",
        "/api/classes",
        Some(&token),
        Some(json!({ "name": "Class 6" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(class["school_id"].is_null());

    for name in ["Math", "English"] {
        let (status, subject) = send(
            &app,
            "POST",
            "/api/subjects",
            Some(&token),
            Some(json!({ "name": name, "class_id": class["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(subject["school_id"].is_null());
    }

    let uri = format!("/api/templates/classes/{}/assign", class["id"]);
    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(json!({ "school_id": school }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["class_created"], true);
    assert_eq!(body["data"]["subjects_created"].as_array().unwrap().len(), 2);
    let instance_id = body["data"]["class"]["id"].clone();
    assert_ne!(instance_id, class["id"]);
    assert_eq!(body["data"]["subjects_created"][0]["class_id"], instance_id);

    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(json!({ "school_id": school }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "School already has this class and all of its subjects");
    assert_eq!(body["data"]["class_created"], false);
    assert_eq!(body["data"]["subjects_skipped"], 2);

    assert_eq!(count_named(&pool, "classes", "Class 6", school).await, 1);
    assert_eq!(count_named(&pool, "subjects", "Math", school).await, 1);
    assert_eq!(count_named(&pool, "subjects", "English", school).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_assignment_fills_in_missing_subjects(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let template = create_test_class(&pool, "Class 6", None).await;
    create_test_subject(&pool, "Math", template, None).await;
    create_test_subject(&pool, "Science", template, None).await;
    let existing = create_test_class(&pool, "Class 6", Some(school)).await;
    create_test_subject(&pool, "Math", existing, Some(school)).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let uri = format!("/api/templates/classes/{template}/assign");
    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(json!({ "school_id": school }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["class"]["id"], existing);
    assert_eq!(body["data"]["subjects_created"][0]["name"], "Science");
    assert_eq!(body["data"]["subjects_skipped"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_school_admin_cannot_assign_to_another_school(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let other = create_test_school(&pool, "Southside").await;
    let template = create_test_class(&pool, "Class 6", None).await;
    let admin = create_test_user(&pool, Role::SchoolAdmin, Some(school), None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &admin).await;

    let uri = format!("/api/templates/classes/{template}/assign");
    let (status, _) = send(&app, "POST", &uri, Some(&token), Some(json!({ "school_id": other }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(count_named(&pool, "classes", "Class 6", other).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_rename_propagates_by_name(pool: PgPool) {
    let copied_school = create_test_school(&pool, "Northside").await;
    let independent_school = create_test_school(&pool, "Southside").await;
    let other_class_school = create_test_school(&pool, "Eastside").await;

    let template = create_test_class(&pool, "Class 6", None).await;
    let template_math = create_test_subject(&pool, "Math", template, None).await;

    let copy = create_test_class(&pool, "Class 6", Some(copied_school)).await;
    let copied_math = create_test_subject(&pool, "Math", copy, Some(copied_school)).await;

    // Created independently, but shares both names with the template.
    let lookalike = create_test_class(&pool, "Class 6", Some(independent_school)).await;
    let lookalike_math =
        create_test_subject(&pool, "Math", lookalike, Some(independent_school)).await;

    let class_7 = create_test_class(&pool, "Class 7", Some(other_class_school)).await;
    let untouched = create_test_subject(&pool, "Math", class_7, Some(other_class_school)).await;

    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;
    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &root).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/templates/subjects/{template_math}"),
        Some(&token),
        Some(json!({ "name": "Mathematics" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["template"]["name"], "Mathematics");

    let mut propagated: Vec<i64> = body["data"]["propagated_subject_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_i64().unwrap())
        .collect();
    propagated.sort();
    assert_eq!(propagated, vec![copied_math, lookalike_math]);

    let name: String = sqlx::query_scalar("SELECT name FROM subjects WHERE id = $1")
        .bind(untouched)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Math");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_template_subject_cannot_be_renamed_through_subjects(pool: PgPool) {
    let template = create_test_class(&pool, "Class 6", None).await;
    let math = create_test_subject(&pool, "Math", template, None).await;
    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &root).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/subjects/{math}"),
        Some(&token),
        Some(json!({ "name": "Mathematics" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_templates_and_school_instances(pool: PgPool) {
    let school = create_test_school(&pool, "Northside").await;
    let template = create_test_class(&pool, "Class 6", None).await;
    create_test_class(&pool, "Class 6", Some(school)).await;
    create_test_subject(&pool, "Math", template, None).await;
    let root = create_test_user(&pool, Role::SuperAdmin, None, None).await;

    let app = setup_test_app(pool.clone());
    let token = get_auth_token(&app, &root).await;

    let (status, body) = send(&app, "GET", "/api/templates/classes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], template);

    let (status, body) = send(&app, "GET", "/api/templates/subjects", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Math");

    let uri = format!("/api/templates/schools/{school}/classes");
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["school_id"], school);
}
