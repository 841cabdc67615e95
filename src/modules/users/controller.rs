use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::ids::UserId;
use scholaris_models::users::{
    CreateUserDto, LinkStudentDto, PaginatedUsersResponse, User, UserFilterParams,
};

use crate::middleware::auth::{AuthUser, RequireAdmin};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Super admins must specify school_id"),
        (status = 403, description = "Not allowed to create this account"),
        (status = 409, description = "Email already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(&state.db, &auth_user.requester, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("role" = Option<String>, Query, description = "Filter by role, e.g. teacher"),
        ("school_id" = Option<i64>, Query, description = "Filter by school"),
        ("class_id" = Option<i64>, Query, description = "Filter by enrolled class"),
        ("limit" = Option<i64>, Query, description = "Page size (1-100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "Page number, 1-indexed")
    ),
    responses(
        (status = 200, description = "Users visible to the requester", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::get_users(&state.db, &auth_user.requester, filters).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_user_by_id(&state.db, &auth_user.requester, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated", body = User),
        (status = 403, description = "Not allowed to manage this account"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<User>, AppError> {
    let user = UserService::deactivate_user(&state.db, &auth_user.requester, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/children",
    params(("id" = i64, Path, description = "Parent user ID")),
    responses(
        (status = 200, description = "Linked students", body = Vec<User>),
        (status = 404, description = "Parent not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_children(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<User>>, AppError> {
    let children = UserService::get_children(&state.db, &auth_user.requester, id).await?;
    Ok(Json(children))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/children",
    params(("id" = i64, Path, description = "Parent user ID")),
    request_body = LinkStudentDto,
    responses(
        (status = 200, description = "Student linked"),
        (status = 403, description = "Not an administrator of this school"),
        (status = 404, description = "Parent or student not found"),
        (status = 422, description = "Parent and student belong to different schools")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn link_student(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<UserId>,
    Json(dto): Json<LinkStudentDto>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    UserService::link_student(&state.db, &auth_user.requester, id, dto.student_id).await?;
    Ok(Json(MessageResponse::message("Student linked to parent")))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/children/{student_id}",
    params(
        ("id" = i64, Path, description = "Parent user ID"),
        ("student_id" = i64, Path, description = "Student user ID")
    ),
    responses(
        (status = 200, description = "Student unlinked"),
        (status = 404, description = "Link not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn unlink_student(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path((id, student_id)): Path<(UserId, UserId)>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    UserService::unlink_student(&state.db, &auth_user.requester, id, student_id).await?;
    Ok(Json(MessageResponse::message("Student unlinked from parent")))
}
