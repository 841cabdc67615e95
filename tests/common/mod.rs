#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use scholaris::router::init_router;
use scholaris::scholaris_models::Role;
use scholaris::state::AppState;
use scholaris::utils::password::hash_password;

pub const PASSWORD: &str = "testpass123";

pub struct TestUser {
    pub id: i64,
    pub email: String,
}

pub fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    init_router(AppState::new(pool))
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub async fn create_test_school(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO schools (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_user(
    pool: &PgPool,
    role: Role,
    school_id: Option<i64>,
    class_id: Option<i64>,
) -> TestUser {
    let email = generate_unique_email();
    let hashed = hash_password(PASSWORD).unwrap();

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (first_name, last_name, email, password, role_id, school_id, class_id)
         VALUES ('Test', 'User', $1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(&email)
    .bind(&hashed)
    .bind(role)
    .bind(school_id)
    .bind(class_id)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser { id, email }
}

pub async fn create_test_class(pool: &PgPool, name: &str, school_id: Option<i64>) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO classes (name, school_id) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(school_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_subject(
    pool: &PgPool,
    name: &str,
    class_id: i64,
    school_id: Option<i64>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO subjects (name, class_id, school_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(class_id)
    .bind(school_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn make_class_admin(pool: &PgPool, teacher_id: i64, class_id: i64) {
    sqlx::query("INSERT INTO class_admin_profiles (user_id, class_id) VALUES ($1, $2)")
        .bind(teacher_id)
        .bind(class_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn get_auth_token(app: &Router, user: &TestUser) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": user.email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

/// Sends one request through the router and returns the status and JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}
